#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Stack(#[from] kure_stack::Error),

    #[error(transparent)]
    Generator(#[from] kure_generators::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
