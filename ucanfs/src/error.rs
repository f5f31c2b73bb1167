use std::{error::Error, fmt::Display};

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a program operation.
pub type ProgramResult<T> = Result<T, ProgramError>;

/// An error that occurred while assembling or running a program.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// Configuration errors.
    #[error("Config error: {0}")]
    ConfigError(#[from] ucanfs_config::ConfigError),

    /// DID errors.
    #[error("DID error: {0}")]
    DidError(#[from] ucanfs_did::DidError),

    /// Token errors are passed through unchanged.
    #[error(transparent)]
    UcanError(#[from] ucanfs_ucan::UcanError),

    /// Data root errors are passed through unchanged.
    #[error(transparent)]
    ReferenceError(#[from] ucanfs_reference::ReferenceError),

    /// The agent's tokens do not allow the operation.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Custom error.
    #[error("Custom error: {0}")]
    Custom(#[from] AnyError),
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ProgramError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> ProgramError {
        ProgramError::Custom(AnyError {
            error: error.into(),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `ProgramResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> ProgramResult<T> {
    Result::Ok(value)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}
