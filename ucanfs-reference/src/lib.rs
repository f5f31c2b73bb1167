//! The history of a principal's data roots and the rules for choosing which root is authoritative.
//!
//! The [`CidLog`] records every root this device has known, newest last. [`select_root`] weighs it
//! against the remotely published pointer, and [`check_version`] makes sure the chosen root is a
//! file system version this crate understands.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod cid_log;
mod error;
mod reconcile;
mod traits;
mod version;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod memory;

pub use cid_log::*;
pub use error::*;
pub use reconcile::*;
pub use traits::*;
pub use version::*;
