//! Key-value storage and the persisted, indexed collections built on top of it.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod error;
mod memstorage;
mod repository;
mod storage;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod container;

pub use error::*;
pub use memstorage::*;
pub use repository::*;
pub use storage::*;
