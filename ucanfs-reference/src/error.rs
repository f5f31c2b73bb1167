use std::{error::Error, fmt::Display};

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a reference operation.
pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// An error that occurred while choosing, checking or publishing a data root.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// Working offline with no root recorded locally.
    #[error("Offline and no local data root to work with")]
    NoLocalRoot,

    /// The file system is older than supported and needs a migration.
    #[error("Incompatible file system version {version}, lowest supported is {min}; the file system needs migrating")]
    VersionTooLow {
        /// The version found.
        version: String,

        /// The lowest supported version.
        min: String,
    },

    /// The file system is newer than supported and the software needs upgrading.
    #[error("Incompatible file system version {version}, highest supported is {max}; this software needs upgrading")]
    VersionTooHigh {
        /// The version found.
        version: String,

        /// The highest supported version.
        max: String,
    },

    /// A version string is not `major.minor.patch`.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// The account refused to publish a data root.
    #[error("Data root update rejected: {0}")]
    UpdateRejected(String),

    /// Storage errors are passed through unchanged.
    #[error(transparent)]
    StoreError(#[from] ucanfs_store::StoreError),

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

impl ReferenceError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> ReferenceError {
        ReferenceError::Custom(AnyError {
            error: error.into(),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `ReferenceResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> ReferenceResult<T> {
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
