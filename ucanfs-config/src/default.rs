//! Default configuration values.

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The default prefix of storage keys.
pub const DEFAULT_NAMESPACE: &str = "ucanfs";

/// The default lifetime, in seconds, of tokens issued without an expiration.
pub const DEFAULT_LIFETIME_SECS: u64 = 30;

/// The default ceiling on proof chain depth.
pub const DEFAULT_MAX_PROOF_DEPTH: usize = 64;

/// The default lowest and highest supported file system versions.
pub const DEFAULT_FILE_SYSTEM_VERSION: &str = "2.0.0";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

pub(crate) fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

pub(crate) const fn default_lifetime_secs() -> u64 {
    DEFAULT_LIFETIME_SECS
}

pub(crate) const fn default_max_proof_depth() -> usize {
    DEFAULT_MAX_PROOF_DEPTH
}

pub(crate) fn default_file_system_version() -> String {
    DEFAULT_FILE_SYSTEM_VERSION.to_string()
}
