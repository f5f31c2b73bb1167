use std::future::Future;

use bytes::Bytes;

use crate::StoreResult;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The storage key suffix of the token collection.
pub const UCANS_KEY: &str = "ucans";

/// The storage key suffix of the content-root log.
pub const CID_LOG_KEY: &str = "cid-log";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The storage keys the persisted collections live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key of the token collection.
    pub ucans: String,

    /// Key of the content-root log.
    pub cid_log: String,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A string-keyed store of opaque byte values.
///
/// Implementations should be cheap to clone; clones are expected to share the same underlying
/// items.
pub trait Storage: Clone + Send + Sync {
    /// Gets the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> impl Future<Output = StoreResult<Option<Bytes>>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: Bytes) -> impl Future<Output = StoreResult<()>> + Send;

    /// Removes the value stored under `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> impl Future<Output = StoreResult<()>> + Send;
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl StorageKeys {
    /// Creates the storage keys of the collections under `namespace`.
    pub fn namespaced(namespace: impl AsRef<str>) -> Self {
        let namespace = namespace.as_ref().trim_end_matches('/');
        Self {
            ucans: format!("{namespace}/{UCANS_KEY}"),
            cid_log: format!("{namespace}/{CID_LOG_KEY}"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
