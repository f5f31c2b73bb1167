//! Error types of the ucan crate.

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type for UCAN operations.
pub type UcanResult<T> = Result<T, UcanError>;

/// Defines the types of errors that can occur in UCAN operations.
#[derive(Debug, Error)]
pub enum UcanError {
    /// The encoded token is structurally invalid.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Unsupported token type
    #[error("Unsupported token type: {0}")]
    UnsupportedTokenType(String),

    /// Json (de)serialization errors
    #[error("Json serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Base64 decoding errors
    #[error("Base64 decoding error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// Key errors
    #[error("Key error: {0}")]
    KeyError(#[from] ucanfs_key::KeyError),

    /// DID errors
    #[error("DID error: {0}")]
    DidError(#[from] ucanfs_did::DidError),

    /// Storage errors are passed through unchanged.
    #[error(transparent)]
    StoreError(#[from] ucanfs_store::StoreError),

    /// Invalid ability
    #[error("Invalid ability: {0}")]
    InvalidAbility(String),

    /// Invalid resource pointer
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// Invalid proof reference
    #[error("Invalid proof reference: {0}")]
    InvalidProofReference(String),

    /// Invalid time bounds
    #[error("Invalid time bounds: nbf: {0}, exp: {1}")]
    InvalidTimeBounds(u64, u64),

    /// A proof needed to derive the root issuer is not in the store.
    #[error("Missing proof: {0}")]
    MissingProof(String),

    /// A proof chain refers back to a token already on the chain.
    #[error("Proof cycle detected at: {0}")]
    ProofCycle(String),

    /// A proof chain is deeper than the configured ceiling.
    #[error("Proof chain deeper than {0} tokens")]
    ProofChainTooDeep(usize),

    /// Invalid access query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `UcanResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> UcanResult<T> {
    Result::Ok(value)
}
