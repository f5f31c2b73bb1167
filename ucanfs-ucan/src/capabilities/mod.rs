mod ability;
mod capability;
mod macros;
mod resource;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use ability::*;
pub use capability::*;
pub use resource::*;
