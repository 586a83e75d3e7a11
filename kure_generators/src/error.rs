#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Scheme(#[from] kure_scheme::Error),

    #[error("{field}: {reason}")]
    ConfigInvalid { field: &'static str, reason: String },
}

impl Error {
    pub fn config_invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::ConfigInvalid {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
