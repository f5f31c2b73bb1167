use std::time::Duration;

use serde::{Deserialize, Serialize};
use structstruck::strike;
use typed_builder::TypedBuilder;
use ucanfs_reference::{SemVer, SupportedVersions};
use ucanfs_store::StorageKeys;

use crate::{
    default::{
        DEFAULT_FILE_SYSTEM_VERSION, DEFAULT_LIFETIME_SECS, DEFAULT_MAX_PROOF_DEPTH,
        DEFAULT_NAMESPACE,
    },
    ConfigError, ConfigResult, MainConfig,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

strike! {
    #[strikethrough[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, TypedBuilder)]]
    /// The configuration of a ucanfs program.
    pub struct Config {
        /// The prefix of every storage key the program uses.
        #[serde(default = "super::default::default_namespace")]
        #[builder(default = super::default::default_namespace(), setter(into))]
        pub namespace: String,

        /// Log component wiring and root selection at `info` instead of `debug`.
        #[serde(default)]
        #[builder(default)]
        pub debug: bool,

        /// The token configuration.
        #[serde(default)]
        #[builder(default)]
        pub ucan:
            /// The token configuration.
            pub struct UcanConfig {
                /// The lifetime, in seconds, of tokens issued without an expiration.
                #[serde(default = "super::default::default_lifetime_secs")]
                #[builder(default = super::default::default_lifetime_secs())]
                pub default_lifetime_secs: u64,

                /// How many proof links are followed from a token.
                #[serde(default = "super::default::default_max_proof_depth")]
                #[builder(default = super::default::default_max_proof_depth())]
                pub max_proof_depth: usize,
            },

        /// The file system configuration.
        #[serde(default)]
        #[builder(default)]
        pub file_system:
            /// The file system configuration.
            pub struct FileSystemConfig {
                /// The lowest supported file system version.
                #[serde(default = "super::default::default_file_system_version")]
                #[builder(default = super::default::default_file_system_version(), setter(into))]
                pub min_version: String,

                /// The highest supported file system version.
                #[serde(default = "super::default::default_file_system_version")]
                #[builder(default = super::default::default_file_system_version(), setter(into))]
                pub max_version: String,
            },
    }
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Config {
    /// Returns the lifetime of tokens issued without an expiration.
    pub fn default_lifetime(&self) -> Duration {
        Duration::from_secs(self.ucan.default_lifetime_secs)
    }

    /// Returns the supported file system versions.
    pub fn supported_versions(&self) -> ConfigResult<SupportedVersions> {
        let min = parse_version(&self.file_system.min_version)?;
        let max = parse_version(&self.file_system.max_version)?;

        SupportedVersions::new(min, max).map_err(|_| {
            ConfigError::EmptyVersionRange(
                self.file_system.min_version.clone(),
                self.file_system.max_version.clone(),
            )
        })
    }

    /// Returns the storage keys under the configured namespace.
    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::namespaced(&self.namespace)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn parse_version(version: &str) -> ConfigResult<SemVer> {
    version
        .parse()
        .map_err(|_| ConfigError::InvalidVersion(version.to_string()))
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl MainConfig for Config {
    fn validate(&self) -> ConfigResult<()> {
        if self.ucan.max_proof_depth == 0 {
            return Err(ConfigError::ZeroProofDepth);
        }

        if self.ucan.default_lifetime_secs == 0 {
            return Err(ConfigError::ZeroLifetime);
        }

        self.supported_versions()?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            debug: false,
            ucan: Default::default(),
            file_system: Default::default(),
        }
    }
}

impl Default for UcanConfig {
    fn default() -> Self {
        Self {
            default_lifetime_secs: DEFAULT_LIFETIME_SECS,
            max_proof_depth: DEFAULT_MAX_PROOF_DEPTH,
        }
    }
}

impl Default for FileSystemConfig {
    fn default() -> Self {
        Self {
            min_version: DEFAULT_FILE_SYSTEM_VERSION.to_string(),
            max_version: DEFAULT_FILE_SYSTEM_VERSION.to_string(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_toml_full() -> anyhow::Result<()> {
        let toml = r#"
        namespace = "alice"
        debug = true

        [ucan]
        default_lifetime_secs = 3600
        max_proof_depth = 8

        [file_system]
        min_version = "1.0.0"
        max_version = "2.1.0"
        "#;

        let config = Config::from_toml_str(toml)?;
        config.validate()?;

        assert_eq!(config.namespace, "alice");
        assert!(config.debug);
        assert_eq!(config.default_lifetime(), Duration::from_secs(3600));
        assert_eq!(config.ucan.max_proof_depth, 8);
        assert_eq!(config.storage_keys().cid_log, "alice/cid-log");

        let supported = config.supported_versions()?;
        assert_eq!(supported.min(), SemVer::new(1, 0, 0));
        assert_eq!(supported.max(), SemVer::new(2, 1, 0));

        Ok(())
    }

    #[test]
    fn test_toml_defaults() -> anyhow::Result<()> {
        let config = Config::from_toml_str("")?;

        assert_eq!(config, Config::default());
        assert_eq!(config, Config::builder().build());
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert!(!config.debug);
        assert_eq!(config.ucan.default_lifetime_secs, DEFAULT_LIFETIME_SECS);
        assert_eq!(config.ucan.max_proof_depth, DEFAULT_MAX_PROOF_DEPTH);
        assert_eq!(config.supported_versions()?, SupportedVersions::default());
        config.validate()?;

        let partial = Config::from_toml_str("[ucan]\nmax_proof_depth = 4")?;
        assert_eq!(partial.ucan.max_proof_depth, 4);
        assert_eq!(partial.ucan.default_lifetime_secs, DEFAULT_LIFETIME_SECS);

        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_values() -> anyhow::Result<()> {
        let zero_depth = Config::from_toml_str("[ucan]\nmax_proof_depth = 0")?;
        assert!(matches!(zero_depth.validate(), Err(ConfigError::ZeroProofDepth)));

        let zero_lifetime = Config::from_toml_str("[ucan]\ndefault_lifetime_secs = 0")?;
        assert!(matches!(zero_lifetime.validate(), Err(ConfigError::ZeroLifetime)));

        let bad_version = Config::builder()
            .file_system(FileSystemConfig::builder().min_version("two").build())
            .build();
        assert!(matches!(bad_version.validate(), Err(ConfigError::InvalidVersion(_))));

        let inverted = Config::builder()
            .file_system(
                FileSystemConfig::builder()
                    .min_version("3.0.0")
                    .max_version("2.0.0")
                    .build(),
            )
            .build();
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::EmptyVersionRange(_, _))
        ));

        Ok(())
    }

    #[test]
    fn test_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "namespace = \"from-file\"")?;

        let config = Config::from_file(file.path())?;
        assert_eq!(config.namespace, "from-file");

        assert!(matches!(
            Config::from_file(file.path().with_extension("missing")),
            Err(ConfigError::IoError(_))
        ));

        Ok(())
    }
}
