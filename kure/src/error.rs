#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Generator(#[from] kure_generators::Error),

    #[error(transparent)]
    Stack(#[from] kure_stack::Error),

    #[error(transparent)]
    Layout(#[from] kure_layout::Error),

    #[error(transparent)]
    Workflow(#[from] kure_workflow::Error),

    #[error(transparent)]
    Writer(#[from] kure_writer::Error),

    #[error("{path}: {reason}")]
    FleetInvalid { path: std::path::PathBuf, reason: String },

    #[error("document {index} in {path}: {reason}")]
    ParseInvalid {
        path: std::path::PathBuf,
        index: usize,
        reason: String,
    },
}

impl Error {
    pub fn fleet_invalid(path: impl Into<std::path::PathBuf>, reason: impl Into<String>) -> Self {
        Error::FleetInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
