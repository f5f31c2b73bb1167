use std::hash::{Hash, Hasher};

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{
    AsymmetricKey, GetKeyType, JwsAlgName, JwsAlgorithm, KeyError, KeyPairBytes, KeyPairGenerate,
    KeyResult, KeyType, PubKey, PublicKeyBytes, PublicKeyGenerate, Sign, Verify,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An [`ed25519`][ref] verifying key.
///
/// [ref]: https://en.wikipedia.org/wiki/EdDSA
pub type Ed25519PubKey = PubKey<VerifyingKey>;

/// An [`ed25519`][ref] key pair with a signing key.
///
/// [ref]: https://en.wikipedia.org/wiki/EdDSA
pub type Ed25519KeyPair = Ed25519Key<SigningKey>;

pub(crate) type Ed25519Key<S> = AsymmetricKey<VerifyingKey, S>;

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<S> Verify for Ed25519Key<S> {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        let signature = Signature::from_slice(signature)
            .map_err(|e| KeyError::InvalidSignature(e.to_string()))?;

        self.public
            .verify_strict(data, &signature)
            .map_err(|e| KeyError::InvalidSignature(e.to_string()))
    }
}

impl Sign for Ed25519KeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature = self
            .private
            .try_sign(data)
            .map_err(|e| KeyError::InvalidSignature(e.to_string()))?;

        Ok(signature.to_bytes().to_vec())
    }
}

impl PublicKeyGenerate for Ed25519PubKey {
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        let public =
            VerifyingKey::try_from(bytes).map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        Ok(Self {
            public,
            private: (),
        })
    }
}

impl KeyPairGenerate for Ed25519KeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        let signing_key = SigningKey::generate(rng);
        Ok(Self {
            public: signing_key.verifying_key(),
            private: signing_key,
        })
    }

    fn from_private_key(bytes: &[u8]) -> KeyResult<Self> {
        let signing_key =
            SigningKey::try_from(bytes).map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        Ok(Self {
            public: signing_key.verifying_key(),
            private: signing_key,
        })
    }
}

impl<S> PublicKeyBytes for Ed25519Key<S> {
    fn public_key_bytes(&self) -> KeyResult<Vec<u8>> {
        Ok(self.public.to_bytes().to_vec())
    }
}

impl KeyPairBytes for Ed25519KeyPair {
    fn private_key_bytes(&self) -> KeyResult<Vec<u8>> {
        Ok(self.private.to_bytes().to_vec())
    }
}

impl<S> JwsAlgName for Ed25519Key<S> {
    fn alg(&self) -> JwsAlgorithm {
        JwsAlgorithm::EdDSA
    }
}

impl<S> GetKeyType for Ed25519Key<S> {
    fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }
}

impl From<Ed25519KeyPair> for Ed25519PubKey {
    fn from(key_pair: Ed25519KeyPair) -> Self {
        Self {
            public: key_pair.public,
            private: (),
        }
    }
}

impl From<&Ed25519KeyPair> for Ed25519PubKey {
    fn from(key_pair: &Ed25519KeyPair) -> Self {
        Self {
            public: key_pair.public,
            private: (),
        }
    }
}

impl Hash for Ed25519PubKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public.to_bytes().hash(state);
    }
}

impl Serialize for Ed25519PubKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.public.to_bytes().to_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ed25519PubKey {
    fn deserialize<D>(deserializer: D) -> Result<Ed25519PubKey, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Ed25519PubKey::from_public_key(&bytes).map_err(serde::de::Error::custom)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
