use std::{error::Error, fmt::Display};

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a storage operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// An error that occurred during a storage operation.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// The persisted container is truncated or has trailing bytes.
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// The persisted container was written by an unknown format version.
    #[error("Unsupported container version: {0}")]
    UnsupportedContainerVersion(u8),

    /// An item of a persisted collection could not be encoded or decoded.
    #[error("Item codec error at position {0}: {1}")]
    ItemCodec(usize, String),

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

impl StoreError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> StoreError {
        StoreError::Custom(AnyError {
            error: error.into(),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `StoreResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> StoreResult<T> {
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
