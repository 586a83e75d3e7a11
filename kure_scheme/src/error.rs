use crate::gvk::Gvk;

/// The error taxonomy shared by every stage of the compilation pipeline.
///
/// Downstream crates (generators, stack, layout, workflow, writer) wrap this
/// via `#[from]` rather than duplicating variants, and add their own kinds
/// for concerns this crate doesn't know about (config validation, dependency
/// cycles, provider lookup).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("document {index}: invalid YAML: {source}")]
    ParseInvalid {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("document {index}: unsupported kind {gvk}")]
    UnsupportedKind { index: usize, gvk: Gvk },

    #[error("{gvk}: no generator registered for this type")]
    UnknownType { gvk: Gvk },

    #[error("document {index}: decoded type does not match the type registered for {gvk}")]
    TypeMismatch { index: usize, gvk: Gvk },

    #[error("{path}: {source}")]
    FileIo {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} error(s) while parsing")]
    Aggregate(Vec<Error>),
}

impl Error {
    /// Folds a list of per-document errors into `Some(Error::Aggregate(_))`,
    /// or `None` if the list is empty. The Parser never returns an empty
    /// aggregate.
    pub fn aggregate(errors: Vec<Error>) -> Option<Error> {
        if errors.is_empty() {
            None
        } else {
            Some(Error::Aggregate(errors))
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
