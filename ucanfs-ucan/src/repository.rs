use std::collections::HashMap;

use libipld::Cid;
use ucanfs_did::Did;
use ucanfs_store::{
    Repository, RepositoryIndex, RepositoryItem, Storage, StoreError, StoreResult,
};

use crate::{
    join_path, list_capabilities, list_facts, root_issuer, Ability, ChainCapabilities, FactMap,
    Ucan, UcanResult, UcanStore, MAX_PROOF_DEPTH,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Indexes the tokens of a [`UcanRepository`] by audience and by content id.
#[derive(Debug, Default)]
pub struct UcanIndex {
    by_audience: HashMap<Did, Vec<usize>>,
    by_cid: HashMap<String, usize>,
}

/// The persisted collection of tokens a principal holds.
///
/// Tokens are kept in insertion order, which is also the order capability lookup considers them in.
pub struct UcanRepository<S> {
    inner: Repository<Ucan, S, UcanIndex>,
    max_proof_depth: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<S> UcanRepository<S>
where
    S: Storage,
{
    /// Loads the tokens stored under `key`.
    pub async fn create(storage: S, key: impl Into<String>) -> UcanResult<Self> {
        Ok(Self {
            inner: Repository::create(storage, key).await?,
            max_proof_depth: MAX_PROOF_DEPTH,
        })
    }

    /// Sets the depth ceiling used when walking proof chains.
    pub fn with_max_proof_depth(mut self, max_proof_depth: usize) -> Self {
        self.max_proof_depth = max_proof_depth;
        self
    }

    /// Returns the depth ceiling used when walking proof chains.
    pub fn max_proof_depth(&self) -> usize {
        self.max_proof_depth
    }

    /// Adds tokens and persists the collection. Tokens already held are skipped.
    pub async fn add(&mut self, ucans: impl IntoIterator<Item = Ucan>) -> UcanResult<()> {
        let mut seen = Vec::new();
        let mut fresh = Vec::new();
        for ucan in ucans {
            let cid = ucan.cid().to_string();
            if self.inner.index().by_cid.contains_key(&cid) || seen.contains(&cid) {
                continue;
            }

            seen.push(cid);
            fresh.push(ucan);
        }

        if fresh.is_empty() {
            return Ok(());
        }

        self.inner.add(fresh).await?;
        Ok(())
    }

    /// Forgets every token, including the persisted copy.
    pub async fn clear(&mut self) -> UcanResult<()> {
        Ok(self.inner.clear().await?)
    }

    /// Returns the tokens addressed to `audience`, in insertion order.
    pub fn audience_tokens(&self, audience: &Did) -> Vec<&Ucan> {
        self.inner
            .index()
            .by_audience
            .get(audience)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|i| self.inner.get_by_index(*i))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the token with content id `cid`.
    pub fn get(&self, cid: &Cid) -> Option<&Ucan> {
        self.inner
            .index()
            .by_cid
            .get(&cid.to_string())
            .and_then(|i| self.inner.get_by_index(*i))
    }

    /// Returns all tokens in insertion order.
    pub fn all(&self) -> &[Ucan] {
        self.inner.all()
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no tokens are held.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Finds a token granting `ability` on the path `segments` of `did`'s resources under `scheme`.
    ///
    /// Path levels are tried from the root (`scheme://did`) down to the full path. At each level
    /// the tokens are scanned in insertion order and the first one with a capability addressing
    /// that level and permitting `ability` is returned. A grant on a shallower level therefore
    /// wins over a more specific one, and between grants on the same level the earlier token wins.
    pub fn lookup_capability<T>(
        &self,
        did: &Did,
        scheme: &str,
        segments: &[T],
        ability: &Ability,
    ) -> Option<&Ucan>
    where
        T: AsRef<str>,
    {
        for level in 0..=segments.len() {
            let prefix = join_path(did, &segments[..level]);

            let found = self.inner.all().iter().find(|ucan| {
                ucan.attenuations().iter().any(|capability| {
                    capability.resource.addresses(scheme, &prefix)
                        && capability.ability.permits(ability)
                })
            });

            if let Some(ucan) = found {
                tracing::debug!(%prefix, %ability, cid = %ucan.cid(), "found capability");
                return Some(ucan);
            }
        }

        tracing::debug!(%did, %ability, "no capability found");
        None
    }

    /// Lists the capabilities of `ucan` and its proofs, resolving proofs against this repository.
    pub fn list_capabilities(&self, ucan: &Ucan) -> ChainCapabilities {
        list_capabilities(self, ucan, self.max_proof_depth)
    }

    /// Merges the facts of `ucan` and its proofs, resolving proofs against this repository.
    pub fn list_facts(&self, ucan: &Ucan) -> FactMap {
        list_facts(self, ucan, self.max_proof_depth)
    }

    /// Resolves the root issuer of `ucan`, resolving proofs against this repository.
    pub fn root_issuer(&self, ucan: &Ucan) -> UcanResult<Did> {
        root_issuer(self, ucan, self.max_proof_depth)
    }

    /// Returns the storage key the tokens are persisted under.
    pub fn storage_key(&self) -> &str {
        self.inner.storage_key()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl RepositoryItem for Ucan {
    fn encode_item(&self) -> StoreResult<Vec<u8>> {
        Ok(self.encode().into_bytes())
    }

    fn decode_item(bytes: &[u8]) -> StoreResult<Self> {
        let encoded = std::str::from_utf8(bytes).map_err(StoreError::custom)?;
        Ucan::decode(encoded).map_err(StoreError::custom)
    }
}

impl RepositoryIndex<Ucan> for UcanIndex {
    fn rebuild(items: &[Ucan]) -> Self {
        let mut index = Self::default();
        for (position, ucan) in items.iter().enumerate() {
            index
                .by_audience
                .entry(ucan.audience().clone())
                .or_default()
                .push(position);
            index.by_cid.insert(ucan.cid().to_string(), position);
        }

        index
    }
}

impl<S> UcanStore for UcanRepository<S>
where
    S: Storage,
{
    fn get_by_cid(&self, cid: &Cid) -> Option<Ucan> {
        self.get(cid).cloned()
    }
}

impl<S> std::fmt::Debug for UcanRepository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UcanRepository")
            .field("inner", &self.inner)
            .field("max_proof_depth", &self.max_proof_depth)
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use ucanfs_key::{Ed25519KeyPair, KeyPairGenerate};
    use ucanfs_store::MemoryStorage;

    use crate::{caps, FS_SCHEME};

    use super::*;

    struct Fixture {
        x_key: Ed25519KeyPair,
        x: Did,
        y: Did,
    }

    fn fixture() -> anyhow::Result<Fixture> {
        let mut rng = rand::thread_rng();
        let x_key = Ed25519KeyPair::generate(&mut rng)?;
        let x = Did::from_key(&x_key)?;
        let y = Did::from_key(&Ed25519KeyPair::generate(&mut rng)?)?;
        Ok(Fixture { x_key, x, y })
    }

    #[test_log::test(tokio::test)]
    async fn test_ucan_repository_persists_and_indexes() -> anyhow::Result<()> {
        let Fixture { x_key, x, y } = fixture()?;
        let storage = MemoryStorage::new();

        let to_x = Ucan::builder().audience(x.clone()).sign(&x_key)?;
        let to_y = Ucan::builder().audience(y.clone()).sign(&x_key)?;

        let mut repository = UcanRepository::create(storage.clone(), "ucans").await?;
        assert!(repository.is_empty());

        repository.add([to_x.clone(), to_y.clone()]).await?;
        repository.add([to_x.clone()]).await?;
        assert_eq!(repository.len(), 2);

        let reloaded = UcanRepository::create(storage, "ucans").await?;
        assert_eq!(reloaded.all(), repository.all());
        assert_eq!(reloaded.audience_tokens(&y), vec![&to_y]);
        assert_eq!(reloaded.audience_tokens(&x), vec![&to_x]);
        assert_eq!(reloaded.get(&to_y.cid()), Some(&to_y));
        assert!(reloaded
            .audience_tokens(&Did::from_key(&Ed25519KeyPair::generate(
                &mut rand::thread_rng()
            )?)?)
            .is_empty());

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_ucan_repository_lookup_prefers_shallowest_level() -> anyhow::Result<()> {
        let Fixture { x_key, x, y } = fixture()?;

        let append_docs = Ucan::builder()
            .audience(y.clone())
            .capabilities(caps! { format!("wnfs://{x}/docs") => ["fs/append"] }?)
            .sign(&x_key)?;
        let superuser = Ucan::builder()
            .audience(y.clone())
            .capabilities(caps! { format!("wnfs://{x}/*") => ["*"] }?)
            .sign(&x_key)?;

        let mut repository = UcanRepository::create(MemoryStorage::new(), "ucans").await?;
        repository.add([append_docs.clone(), superuser.clone()]).await?;

        // The root level is checked before `docs`, so the later superuser token wins.
        let found =
            repository.lookup_capability(&x, FS_SCHEME, &["docs", "a.txt"], &Ability::fs("append")?);
        assert_eq!(found, Some(&superuser));

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_ucan_repository_lookup_insertion_order_within_level() -> anyhow::Result<()> {
        let Fixture { x_key, x, y } = fixture()?;

        let read = Ucan::builder()
            .audience(y.clone())
            .capabilities(caps! { format!("wnfs://{x}/public/") => ["fs/overwrite"] }?)
            .sign(&x_key)?;
        let everything = Ucan::builder()
            .audience(y.clone())
            .capabilities(caps! { format!("wnfs://{x}/public/*") => ["fs/*"] }?)
            .sign(&x_key)?;

        let mut repository = UcanRepository::create(MemoryStorage::new(), "ucans").await?;
        repository.add([read.clone(), everything.clone()]).await?;

        let path = ["public", "notes.md"];
        assert_eq!(
            repository.lookup_capability(&x, FS_SCHEME, &path, &Ability::fs("delete")?),
            Some(&read)
        );
        assert_eq!(
            repository.lookup_capability(&x, FS_SCHEME, &path, &Ability::fs("*")?),
            Some(&everything)
        );
        assert_eq!(
            repository.lookup_capability(&x, FS_SCHEME, &["private"], &Ability::fs("read")?),
            None
        );
        assert_eq!(
            repository.lookup_capability(&x, "other", &path, &Ability::fs("read")?),
            None
        );
        assert_eq!(
            repository.lookup_capability(&y, FS_SCHEME, &path, &Ability::fs("read")?),
            None
        );

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_ucan_repository_root_issuer() -> anyhow::Result<()> {
        let Fixture { x_key, x, y } = fixture()?;

        let b = Ucan::builder().audience(x.clone()).sign(&x_key)?;
        let c = Ucan::builder()
            .audience(y.clone())
            .proofs([b.cid()])
            .sign(&x_key)?;

        let mut repository = UcanRepository::create(MemoryStorage::new(), "ucans").await?;
        repository.add([c.clone()]).await?;
        assert!(matches!(
            repository.root_issuer(&c),
            Err(crate::UcanError::MissingProof(_))
        ));

        repository.add([b]).await?;
        assert_eq!(repository.root_issuer(&c)?, x);
        assert!(repository.list_capabilities(&c).is_complete());

        Ok(())
    }
}
