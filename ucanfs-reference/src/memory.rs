//! In-memory collaborators for tests and local development.
//!
//! Clones of each type share their state, so a test can keep a handle after giving one away.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use libipld::Cid;
use tokio::sync::RwLock;
use ucanfs_did::Did;
use ucanfs_ucan::{account_ability, Capability, Ucan, ACCOUNT_SCHEME};

use crate::{
    Account, AccountProperties, DataRoot, Depot, Dns, ReferenceError, ReferenceResult,
    UserMessages,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A single published data root pointer.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataRoot {
    pointer: Arc<RwLock<Option<Cid>>>,
}

/// An account that publishes into a [`MemoryDataRoot`].
///
/// Publishing requires `account/*` on `account://<did>` and at least one proof.
#[derive(Debug, Clone)]
pub struct MemoryAccount {
    did: Did,
    data_root: MemoryDataRoot,
}

/// File system version markers by root.
#[derive(Debug, Clone, Default)]
pub struct MemoryDepot {
    versions: Arc<RwLock<HashMap<String, String>>>,
}

/// DNSLink and TXT records by domain.
#[derive(Debug, Clone, Default)]
pub struct MemoryDns {
    dns_links: Arc<RwLock<HashMap<String, String>>>,
    txt_records: Arc<RwLock<HashMap<String, String>>>,
}

/// A message sent through [`RecordingUserMessages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMessage {
    /// [`UserMessages::version_too_high`] was called with this version.
    VersionTooHigh(String),

    /// [`UserMessages::version_too_low`] was called with this version.
    VersionTooLow(String),
}

/// Records every message it is asked to show.
#[derive(Debug, Clone, Default)]
pub struct RecordingUserMessages {
    messages: Arc<RwLock<Vec<UserMessage>>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MemoryDataRoot {
    /// Creates a pointer with nothing published.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the published root.
    pub async fn get(&self) -> Option<Cid> {
        *self.pointer.read().await
    }

    /// Publishes `cid` directly.
    pub async fn set(&self, cid: Cid) {
        *self.pointer.write().await = Some(cid);
    }
}

impl MemoryAccount {
    /// Creates the account of `did`, publishing into `data_root`.
    pub fn new(did: Did, data_root: MemoryDataRoot) -> Self {
        Self { did, data_root }
    }

    /// Returns the account's DID.
    pub fn did(&self) -> &Did {
        &self.did
    }
}

impl MemoryDepot {
    /// Creates a depot with no markers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the version marker of the file system at `root`.
    pub async fn set_version(&self, root: &Cid, version: impl Into<String>) {
        self.versions
            .write()
            .await
            .insert(root.to_string(), version.into());
    }
}

impl MemoryDns {
    /// Creates a resolver with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the DNSLink target of `domain`.
    pub async fn set_dns_link(&self, domain: impl Into<String>, target: impl Into<String>) {
        self.dns_links
            .write()
            .await
            .insert(domain.into(), target.into());
    }

    /// Sets the TXT record of `domain`.
    pub async fn set_txt_record(&self, domain: impl Into<String>, record: impl Into<String>) {
        self.txt_records
            .write()
            .await
            .insert(domain.into(), record.into());
    }
}

impl RecordingUserMessages {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the messages recorded so far.
    pub async fn messages(&self) -> Vec<UserMessage> {
        self.messages.read().await.clone()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl DataRoot for MemoryDataRoot {
    async fn lookup(&self, _: &AccountProperties) -> ReferenceResult<Option<Cid>> {
        Ok(self.get().await)
    }
}

#[async_trait]
impl Account for MemoryAccount {
    fn properties(&self) -> AccountProperties {
        AccountProperties::from([("did".to_string(), self.did.to_string())])
    }

    async fn can_update_data_root(&self, capabilities: &[Capability]) -> bool {
        let required = account_ability();
        capabilities.iter().any(|capability| {
            capability
                .resource
                .addresses(ACCOUNT_SCHEME, self.did.as_str())
                && capability.ability.permits(&required)
        })
    }

    async fn update_data_root(&self, cid: &Cid, proofs: &[Ucan]) -> ReferenceResult<()> {
        if proofs.is_empty() {
            return Err(ReferenceError::UpdateRejected(
                "no proofs were given".to_string(),
            ));
        }

        self.data_root.set(*cid).await;
        Ok(())
    }
}

#[async_trait]
impl Depot for MemoryDepot {
    async fn file_system_version(&self, root: &Cid) -> ReferenceResult<Option<String>> {
        Ok(self.versions.read().await.get(&root.to_string()).cloned())
    }
}

#[async_trait]
impl Dns for MemoryDns {
    async fn lookup_dns_link(&self, domain: &str) -> ReferenceResult<Option<String>> {
        Ok(self.dns_links.read().await.get(domain).cloned())
    }

    async fn lookup_txt_record(&self, domain: &str) -> ReferenceResult<Option<String>> {
        Ok(self.txt_records.read().await.get(domain).cloned())
    }
}

#[async_trait]
impl UserMessages for RecordingUserMessages {
    async fn version_too_high(&self, version: &str) {
        self.messages
            .write()
            .await
            .push(UserMessage::VersionTooHigh(version.to_string()));
    }

    async fn version_too_low(&self, version: &str) {
        self.messages
            .write()
            .await
            .push(UserMessage::VersionTooLow(version.to_string()));
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
