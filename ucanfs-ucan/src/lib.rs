//! [UCAN][ucan] authorization tokens: building, encoding, validating, walking delegation chains,
//! and a persisted repository that resolves path-based capabilities.
//!
//! Tokens are issued by `did:key` principals. The [`KeyRegistry`][ucanfs_did::KeyRegistry] decides
//! which key types and algorithms are accepted.
//!
//! [ucan]: https://github.com/ucan-wg/spec

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod builder;
mod capabilities;
mod chain;
mod error;
mod facts;
mod header;
mod payload;
mod proofs;
mod query;
mod repository;
mod signature;
mod ucan;
mod validate;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use builder::*;
pub use capabilities::*;
pub use chain::*;
pub use error::*;
pub use facts::*;
pub use header::*;
pub use payload::*;
pub use proofs::*;
pub use query::*;
pub use repository::*;
pub use signature::*;
pub use ucan::*;
pub use validate::*;
