use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{Storage, StoreResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An in-memory [`Storage`]. Clones share the same items.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, Bytes>>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Storage for MemoryStorage {
    async fn get_item(&self, key: &str) -> StoreResult<Option<Bytes>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() -> anyhow::Result<()> {
        let storage = MemoryStorage::new();
        assert!(storage.get_item("a").await?.is_none());

        storage.set_item("a", Bytes::from_static(b"one")).await?;
        let shared = storage.clone();
        assert_eq!(
            shared.get_item("a").await?,
            Some(Bytes::from_static(b"one"))
        );

        shared.set_item("a", Bytes::from_static(b"two")).await?;
        assert_eq!(
            storage.get_item("a").await?,
            Some(Bytes::from_static(b"two"))
        );

        storage.remove_item("a").await?;
        storage.remove_item("a").await?;
        assert!(shared.is_empty().await);

        Ok(())
    }
}
