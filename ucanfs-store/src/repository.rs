use std::fmt;

use bytes::Bytes;
use libipld::Cid;

use crate::{container, Storage, StoreError, StoreResult};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// An item that can be kept in a [`Repository`].
pub trait RepositoryItem: Clone + Send + Sync {
    /// Encodes the item into the bytes stored in the container.
    fn encode_item(&self) -> StoreResult<Vec<u8>>;

    /// Decodes an item from its stored bytes.
    fn decode_item(bytes: &[u8]) -> StoreResult<Self>
    where
        Self: Sized;
}

/// A derived index over the items of a [`Repository`].
///
/// The index is rebuilt from scratch whenever the collection changes.
pub trait RepositoryIndex<T>: Default + Send + Sync {
    /// Builds the index for `items`.
    fn rebuild(items: &[T]) -> Self;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An ordered collection mirrored to a single [`Storage`] key.
///
/// The whole collection is re-persisted on every [`add`][Repository::add]. The persisted write is
/// staged first and the in-memory collection and its index only advance once it succeeds, so a
/// failed write leaves the repository as it was.
///
/// Mutations are expected to be serialized by the caller; `add` takes `&mut self`.
pub struct Repository<T, S, X = ()> {
    storage: S,
    key: String,
    items: Vec<T>,
    index: X,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<T, S, X> Repository<T, S, X>
where
    T: RepositoryItem,
    S: Storage,
    X: RepositoryIndex<T>,
{
    /// Loads the collection stored under `key`, or starts empty if nothing is stored there.
    pub async fn create(storage: S, key: impl Into<String>) -> StoreResult<Self> {
        let key = key.into();

        let items = match storage.get_item(&key).await? {
            Some(bytes) => container::decode(bytes)?
                .iter()
                .enumerate()
                .map(|(position, bytes)| {
                    T::decode_item(bytes).map_err(|e| StoreError::ItemCodec(position, e.to_string()))
                })
                .collect::<StoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        tracing::debug!(%key, len = items.len(), "loaded repository");

        Ok(Self {
            index: X::rebuild(&items),
            storage,
            key,
            items,
        })
    }

    /// Appends `items` and persists the whole collection.
    pub async fn add(&mut self, items: impl IntoIterator<Item = T>) -> StoreResult<()> {
        let mut staged = self.items.clone();
        staged.extend(items);

        let encoded = staged
            .iter()
            .map(T::encode_item)
            .collect::<StoreResult<Vec<_>>>()?;

        self.storage
            .set_item(&self.key, container::encode(encoded.as_slice())?)
            .await?;

        tracing::trace!(key = %self.key, len = staged.len(), "persisted repository");

        self.index = X::rebuild(&staged);
        self.items = staged;

        Ok(())
    }

    /// Removes every item, along with the persisted collection.
    pub async fn clear(&mut self) -> StoreResult<()> {
        self.storage.remove_item(&self.key).await?;
        self.items.clear();
        self.index = X::default();

        Ok(())
    }

    /// Returns the first item matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| predicate(item))
    }

    /// Returns the position of the first item matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&T) -> bool) -> Option<usize> {
        self.items.iter().position(predicate)
    }

    /// Returns the item at `index`.
    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the last item.
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Returns all items in insertion order.
    pub fn all(&self) -> &[T] {
        &self.items
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the derived index.
    pub fn index(&self) -> &X {
        &self.index
    }

    /// Returns the storage key the collection is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<T> RepositoryIndex<T> for () {
    fn rebuild(_: &[T]) -> Self {}
}

impl RepositoryItem for Cid {
    fn encode_item(&self) -> StoreResult<Vec<u8>> {
        Ok(self.to_string().into_bytes())
    }

    fn decode_item(bytes: &[u8]) -> StoreResult<Self> {
        let s = std::str::from_utf8(bytes).map_err(StoreError::custom)?;
        Cid::try_from(s).map_err(StoreError::custom)
    }
}

impl RepositoryItem for Bytes {
    fn encode_item(&self) -> StoreResult<Vec<u8>> {
        Ok(self.to_vec())
    }

    fn decode_item(bytes: &[u8]) -> StoreResult<Self> {
        Ok(Bytes::copy_from_slice(bytes))
    }
}

impl<T, S, X> fmt::Debug for Repository<T, S, X>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("key", &self.key)
            .field("items", &self.items)
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::MemoryStorage;

    use super::*;

    #[derive(Default)]
    struct LengthIndex(HashMap<usize, Vec<usize>>);

    impl RepositoryIndex<Bytes> for LengthIndex {
        fn rebuild(items: &[Bytes]) -> Self {
            let mut index = HashMap::<usize, Vec<usize>>::new();
            for (position, item) in items.iter().enumerate() {
                index.entry(item.len()).or_default().push(position);
            }

            Self(index)
        }
    }

    #[derive(Clone)]
    struct FailingStorage;

    impl Storage for FailingStorage {
        async fn get_item(&self, _: &str) -> StoreResult<Option<Bytes>> {
            Ok(None)
        }

        async fn set_item(&self, _: &str, _: Bytes) -> StoreResult<()> {
            Err(StoreError::custom(anyhow::anyhow!("disk full")))
        }

        async fn remove_item(&self, _: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_repository_persists_and_reloads() -> anyhow::Result<()> {
        let storage = MemoryStorage::new();

        let mut repo: Repository<Bytes, _, LengthIndex> =
            Repository::create(storage.clone(), "items").await?;
        assert!(repo.is_empty());

        repo.add([Bytes::from_static(b"ab"), Bytes::from_static(b"c")])
            .await?;
        repo.add([Bytes::from_static(b"de")]).await?;

        assert_eq!(repo.len(), 3);
        assert_eq!(repo.index().0.get(&2), Some(&vec![0, 2]));
        assert_eq!(repo.get_by_index(1), Some(&Bytes::from_static(b"c")));
        assert_eq!(repo.position(|b| &b[..] == b"de"), Some(2));
        assert_eq!(repo.find(|b| b.len() == 1), Some(&Bytes::from_static(b"c")));

        let reloaded: Repository<Bytes, _, LengthIndex> =
            Repository::create(storage, "items").await?;
        assert_eq!(reloaded.all(), repo.all());
        assert_eq!(reloaded.index().0.get(&1), Some(&vec![1]));

        repo.clear().await?;
        assert!(repo.is_empty());
        assert!(repo.index().0.is_empty());
        assert!(repo.storage().is_empty().await);

        Ok(())
    }

    #[tokio::test]
    async fn test_repository_add_is_not_applied_when_persisting_fails() -> anyhow::Result<()> {
        let mut repo: Repository<Bytes, _, LengthIndex> =
            Repository::create(FailingStorage, "items").await?;

        let result = repo.add([Bytes::from_static(b"ab")]).await;

        assert!(result.is_err());
        assert!(repo.is_empty());
        assert!(repo.index().0.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_repository_rejects_corrupt_blob() -> anyhow::Result<()> {
        let storage = MemoryStorage::new();
        storage
            .set_item("cids", container::encode(&[b"not a cid"])?)
            .await?;

        let result = Repository::<Cid, _>::create(storage, "cids").await;
        assert!(matches!(result, Err(StoreError::ItemCodec(0, _))));

        Ok(())
    }
}
