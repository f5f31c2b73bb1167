//! Asymmetric keys used to sign and verify authorization tokens.
//!
//! Two signature schemes are supported: `ed25519` and RSA with PKCS#1 v1.5 padding over SHA-256.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod ed25519;
mod error;
mod jws;
mod key;
mod rsa;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use ed25519::*;
pub use error::*;
pub use jws::*;
pub use key::*;
pub use self::rsa::*;
pub use traits::*;
