//! Error types of the key crate.

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Defines the types of errors that can occur in key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The signature is malformed or does not match the data.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The key bytes could not be decoded.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Unsupported JWS algorithm name.
    #[error("Unsupported JWS algorithm name: {0}")]
    UnsupportedJwsAlgName(String),

    /// Unsupported key type.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// RSA errors.
    #[error("RSA error: {0}")]
    RsaError(#[from] ::rsa::Error),
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `KeyResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> KeyResult<T> {
    Result::Ok(value)
}
