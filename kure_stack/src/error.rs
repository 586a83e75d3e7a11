#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Generator(#[from] kure_generators::Error),

    #[error("duplicate {kind} name {name:?}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("dependency cycle among bundles: {0:?}")]
    DependencyCycle(Vec<String>),
}

pub type Result<T> = std::result::Result<T, Error>;
