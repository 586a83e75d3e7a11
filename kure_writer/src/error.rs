#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Scheme(#[from] kure_scheme::Error),

    #[error("{path}: {source}")]
    FileIo {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate file name {name:?} in directory {dir}")]
    DuplicateFileName { dir: std::path::PathBuf, name: String },
}

impl Error {
    pub fn file_io(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Error::FileIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
