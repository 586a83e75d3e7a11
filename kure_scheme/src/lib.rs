#![warn(missing_docs)]
//! The Scheme Registry, typed/free object model, YAML parser, and
//! deterministic serializer that every other Kure crate builds on.

mod apitype;
mod error;
mod gvk;
mod object;
mod parser;
mod registry;
mod serializer;
pub mod types;

pub use apitype::ApiType;
pub use error::{Error, Result};
pub use gvk::Gvk;
pub use object::{from_typed, Object};
pub use parser::{parse, parse_dir, ParseOptions};
pub use registry::is_known;
pub use serializer::{serialize, StripLevel};
