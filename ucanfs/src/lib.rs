//! # Ucanfs
//!
//! Capability-based authorization and data root reconciliation for device-local file systems.
//!
//! A [`Program`] is assembled from a [`Config`][ucanfs_config::Config] and explicit
//! [`Components`]: the storage, the agent's key pair, the DID key registry and the collaborators
//! that reach the outside world. It holds the agent's tokens and the local history of data roots,
//! answers whether an operation is authorized, and decides which data root is authoritative.
//!
//! The member crates are re-exported for convenience.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod components;
mod error;
mod program;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use components::*;
pub use error::*;
pub use program::*;

pub use ucanfs_config as config;
pub use ucanfs_did as did;
pub use ucanfs_key as key;
pub use ucanfs_reference as reference;
pub use ucanfs_store as store;
pub use ucanfs_ucan as ucan;
