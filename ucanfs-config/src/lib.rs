//! # Ucanfs Config
//!
//! Typed configuration for assembling a ucanfs program, loaded from TOML with every field
//! defaulted.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod config;
mod error;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod default;

pub use config::*;
pub use error::*;
pub use traits::*;
