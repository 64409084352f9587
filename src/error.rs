//! Contains the main error type for the library.
use thiserror::Error;

/// The main error type for the library. Each module has it's own error type that is contained by this error.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Not Found")]
    NotFound,
    #[error(transparent)]
    TimingError(#[from] crate::timing::error::Error),
    #[error(transparent)]
    RegisterError(#[from] crate::registers::Error),
}
