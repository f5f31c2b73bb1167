//! Error types of the did crate.

use std::{error::Error, fmt::Display};

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A type alias for a `Result` that uses `DidError` as the error type.
pub type DidResult<T> = Result<T, DidError>;

/// The main error type of the did crate.
#[derive(Debug, Error)]
pub enum DidError {
    /// The string is not a syntactically valid DID.
    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    /// The DID does not use the `did:key` method.
    #[error("Expected the `did:key` method: {0}")]
    UnsupportedMethod(String),

    /// No registered key type matches the multicodec prefix of the DID.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Key error.
    #[error("Key error: {0}")]
    KeyError(#[from] ucanfs_key::KeyError),

    /// Base encoding or decoding error.
    #[error("Base encoding or decoding error: {0}")]
    BaseError(#[from] multibase::Error),

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

impl DidError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> DidError {
        DidError::Custom(AnyError {
            error: error.into(),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `DidResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> DidResult<T> {
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
