use std::{collections::BTreeMap, fmt, sync::Arc};

use ucanfs_key::{
    Ed25519PubKey, JwsAlgorithm, KeyType, PublicKeyGenerate, RsaPubKey, Verify,
};

use crate::{multicodec_prefix, Did, DidError, DidResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A signature verification function: `(message, public_key, signature) -> valid`.
pub type VerifyFn = Arc<dyn Fn(&[u8], &[u8], &[u8]) -> bool + Send + Sync>;

/// Maps key-type tags to their `did:key` multicodec prefix, JWS algorithm name and verifier.
///
/// A [`Default`] registry knows `ed25519` (`EdDSA`) and `rsa` (`RS256`). Verification against an
/// unregistered tag returns `false` instead of failing.
#[derive(Clone)]
pub struct KeyRegistry {
    registrations: BTreeMap<String, Registration>,
}

/// The key material recovered from a `did:key` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredKey {
    /// The tag the key type is registered under.
    pub key_type: String,

    /// The JWS algorithm name tokens issued by this key must declare.
    pub algorithm: String,

    /// The raw public key bytes with the multicodec prefix stripped.
    pub public_key: Vec<u8>,
}

#[derive(Clone)]
struct Registration {
    prefix: Vec<u8>,
    algorithm: String,
    verify: VerifyFn,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl KeyRegistry {
    /// Creates a registry with no key types.
    pub fn empty() -> Self {
        Self {
            registrations: BTreeMap::new(),
        }
    }

    /// Registers a key type, replacing any earlier registration under the same tag.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        prefix: impl Into<Vec<u8>>,
        algorithm: impl Into<String>,
        verify: VerifyFn,
    ) -> &mut Self {
        let tag = tag.into();
        tracing::trace!(%tag, "registering key type");

        self.registrations.insert(
            tag,
            Registration {
                prefix: prefix.into(),
                algorithm: algorithm.into(),
                verify,
            },
        );

        self
    }

    /// Recovers the key type, algorithm and public key embedded in a `did:key` identifier.
    ///
    /// When several prefixes match, the longest one wins.
    pub fn recover(&self, did: &Did) -> DidResult<RecoveredKey> {
        let bytes = did.multicodec_key()?;

        let (tag, registration) = self
            .registrations
            .iter()
            .filter(|(_, r)| !r.prefix.is_empty() && bytes.starts_with(&r.prefix))
            .max_by_key(|(_, r)| r.prefix.len())
            .ok_or_else(|| DidError::UnsupportedKeyType(did.to_string()))?;

        Ok(RecoveredKey {
            key_type: tag.clone(),
            algorithm: registration.algorithm.clone(),
            public_key: bytes[registration.prefix.len()..].to_vec(),
        })
    }

    /// Verifies `signature` over `message` with the verifier registered under `tag`.
    pub fn verify(&self, tag: &str, message: &[u8], public_key: &[u8], signature: &[u8]) -> bool {
        match self.registrations.get(tag) {
            Some(registration) => (registration.verify)(message, public_key, signature),
            None => {
                tracing::debug!(%tag, "no verifier registered for key type");
                false
            }
        }
    }

    /// Encodes a `did:key` identifier for a public key of a registered key type.
    pub fn did_for(&self, tag: &str, public_key: &[u8]) -> DidResult<Did> {
        let registration = self
            .registrations
            .get(tag)
            .ok_or_else(|| DidError::UnsupportedKeyType(tag.to_string()))?;

        Ok(Did::from_multicodec(&registration.prefix, public_key))
    }

    /// Returns the JWS algorithm name registered under `tag`.
    pub fn algorithm(&self, tag: &str) -> Option<&str> {
        self.registrations.get(tag).map(|r| r.algorithm.as_str())
    }

    /// Returns the registered tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.registrations.keys().map(String::as_str)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn verify_ed25519(message: &[u8], public_key: &[u8], signature: &[u8]) -> bool {
    Ed25519PubKey::from_public_key(public_key)
        .and_then(|key| key.verify(message, signature))
        .is_ok()
}

fn verify_rsa(message: &[u8], public_key: &[u8], signature: &[u8]) -> bool {
    RsaPubKey::from_public_key(public_key)
        .and_then(|key| key.verify(message, signature))
        .is_ok()
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for KeyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        registry
            .register(
                KeyType::Ed25519.tag(),
                multicodec_prefix(KeyType::Ed25519),
                JwsAlgorithm::EdDSA.to_string(),
                Arc::new(verify_ed25519),
            )
            .register(
                KeyType::Rsa.tag(),
                multicodec_prefix(KeyType::Rsa),
                JwsAlgorithm::RS256.to_string(),
                Arc::new(verify_rsa),
            );

        registry
    }
}

impl fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.registrations
                    .iter()
                    .map(|(tag, r)| (tag, (&r.prefix, &r.algorithm))),
            )
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
