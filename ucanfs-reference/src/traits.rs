use std::collections::BTreeMap;

use async_trait::async_trait;
use libipld::Cid;
use ucanfs_ucan::{Capability, Ucan};

use crate::ReferenceResult;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The properties identifying an account to the services that publish its data root.
pub type AccountProperties = BTreeMap<String, String>;

/// A [`UserMessages`] that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUserMessages;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The account system a principal's data root is published through.
#[async_trait]
pub trait Account: Send + Sync {
    /// Returns the properties other services use to find this account.
    fn properties(&self) -> AccountProperties;

    /// Checks whether `capabilities` are enough to publish a new data root.
    async fn can_update_data_root(&self, capabilities: &[Capability]) -> bool;

    /// Publishes `cid` as the account's data root, proving authority with `proofs`.
    ///
    /// A refusal is reported as [`ReferenceError::UpdateRejected`][crate::ReferenceError::UpdateRejected].
    async fn update_data_root(&self, cid: &Cid, proofs: &[Ucan]) -> ReferenceResult<()>;
}

/// Resolves the remotely published data root of an account.
#[async_trait]
pub trait DataRoot: Send + Sync {
    /// Returns the published root, or `None` if the account has not published one yet.
    async fn lookup(&self, account: &AccountProperties) -> ReferenceResult<Option<Cid>>;
}

/// DNS lookups.
#[async_trait]
pub trait Dns: Send + Sync {
    /// Returns the DNSLink target of `domain`.
    async fn lookup_dns_link(&self, domain: &str) -> ReferenceResult<Option<String>>;

    /// Returns the TXT record of `domain`.
    async fn lookup_txt_record(&self, domain: &str) -> ReferenceResult<Option<String>>;
}

/// Reads from the content-addressed store holding file systems.
#[async_trait]
pub trait Depot: Send + Sync {
    /// Returns the version marker of the file system rooted at `root`, if it has one.
    async fn file_system_version(&self, root: &Cid) -> ReferenceResult<Option<String>>;
}

/// Tells the user about problems they have to act on.
///
/// Each hook is awaited before the matching error is returned.
#[async_trait]
pub trait UserMessages: Send + Sync {
    /// The file system is newer than this software understands.
    async fn version_too_high(&self, version: &str);

    /// The file system is older than this software understands.
    async fn version_too_low(&self, version: &str);
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl UserMessages for TracingUserMessages {
    async fn version_too_high(&self, version: &str) {
        tracing::warn!(
            %version,
            "cannot sync this file system: it is newer than this app understands, the app needs upgrading"
        );
    }

    async fn version_too_low(&self, version: &str) {
        tracing::warn!(
            %version,
            "cannot sync this file system: it is outdated and needs to be migrated"
        );
    }
}
