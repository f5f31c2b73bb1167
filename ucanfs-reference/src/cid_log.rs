use libipld::Cid;
use ucanfs_store::{Repository, Storage};

use crate::ReferenceResult;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The data roots this device has known for a principal, in arrival order.
///
/// The log only grows. Arrival order is not necessarily time order: a root fetched from the
/// remote pointer is appended when it is first seen.
#[derive(Debug)]
pub struct CidLog<S> {
    inner: Repository<Cid, S>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<S> CidLog<S>
where
    S: Storage,
{
    /// Loads the log stored under `key`.
    pub async fn create(storage: S, key: impl Into<String>) -> ReferenceResult<Self> {
        Ok(Self {
            inner: Repository::create(storage, key).await?,
        })
    }

    /// Appends `cid` and persists the log.
    pub async fn add(&mut self, cid: Cid) -> ReferenceResult<()> {
        self.inner.add([cid]).await?;
        tracing::debug!(%cid, len = self.inner.len(), "appended data root");
        Ok(())
    }

    /// Returns the position of `cid`, comparing canonical string forms.
    pub fn index_of(&self, cid: &Cid) -> Option<usize> {
        let cid = cid.to_string();
        self.inner.position(|c| c.to_string() == cid)
    }

    /// Returns the most recently added root.
    pub fn newest(&self) -> Option<&Cid> {
        self.inner.last()
    }

    /// Returns the first root matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&Cid) -> bool) -> Option<&Cid> {
        self.inner.find(predicate)
    }

    /// Returns the root at `index`.
    pub fn get_by_index(&self, index: usize) -> Option<&Cid> {
        self.inner.get_by_index(index)
    }

    /// Returns every root, oldest first.
    pub fn all(&self) -> &[Cid] {
        self.inner.all()
    }

    /// Returns the number of roots.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no root has been recorded.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the storage key the log is persisted under.
    pub fn storage_key(&self) -> &str {
        self.inner.storage_key()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
