//! Decentralized identifiers for the `did:key` method and a registry that maps the key types they
//! embed to signature verifiers.
//!
//! A `did:key` identifier is `did:key:` followed by the [base58btc][multibase] multibase encoding of
//! a [multicodec][multicodec] prefix and the raw public key bytes. The [`KeyRegistry`] recovers the
//! key type and public key from such an identifier and dispatches verification to the function
//! registered for that key type.
//!
//! [multibase]: https://github.com/multiformats/multibase
//! [multicodec]: https://github.com/multiformats/multicodec

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod did;
mod error;
mod regex;
mod registry;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use did::*;
pub use error::*;
pub use registry::*;
