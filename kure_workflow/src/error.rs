#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] kure_layout::Error),

    #[error("unsupported GitOps provider {0:?}")]
    UnsupportedProvider(String),

    #[error("no planned directory corresponds to {path}")]
    PathNotPlanned { path: std::path::PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
