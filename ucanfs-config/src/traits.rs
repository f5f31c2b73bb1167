use std::{fs, path::Path};

use crate::ConfigResult;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The main configuration trait.
pub trait MainConfig {
    /// Validates the configuration.
    fn validate(&self) -> ConfigResult<()>;

    /// Creates a configuration from a toml file.
    fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self>
    where
        Self: Sized + for<'de> serde::Deserialize<'de>,
    {
        let config = fs::read_to_string(path)?;
        Self::from_toml_str(config)
    }

    /// Creates a configuration from a toml string.
    fn from_toml_str(config: impl AsRef<str>) -> ConfigResult<Self>
    where
        Self: Sized + for<'de> serde::Deserialize<'de>,
    {
        let config = toml::from_str(config.as_ref())?;
        Ok(config)
    }
}
