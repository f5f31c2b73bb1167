use std::{fmt::Display, str::FromStr};

use multibase::Base;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ucanfs_key::{GetKeyType, KeyType, PublicKeyBytes};

use crate::{regex::RE_DID, DidError, DidResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The method name of `did:key` identifiers.
pub const KEY_METHOD: &str = "key";

/// `ed25519-pub` varuint public key code and varuint representation.
pub const ED25519_PUB_KEY_CODE: (u16, [u8; 2]) = (0xed, [0xED, 0x01]);

/// `rsa-pub` varuint public key code and varuint representation.
pub const RSA_PUB_KEY_CODE: (u16, [u8; 2]) = (0x1205, [0x85, 0x24]);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A syntactically valid [decentralized identifier][did].
///
/// The identifier is kept in its string form and compared as such. Only the `did:key` method can be
/// resolved to key material, see [`KeyRegistry::recover`][crate::KeyRegistry::recover].
///
/// [did]: https://www.w3.org/TR/did-core/
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Did(String);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Did {
    /// Creates a `did:key` identifier for the public half of `key`.
    pub fn from_key<K>(key: &K) -> DidResult<Self>
    where
        K: PublicKeyBytes + GetKeyType,
    {
        let public_key = key.public_key_bytes()?;
        Ok(Self::from_multicodec(
            multicodec_prefix(key.key_type()),
            &public_key,
        ))
    }

    /// Creates a `did:key` identifier from a multicodec prefix and the raw public key bytes.
    pub fn from_multicodec(prefix: &[u8], public_key: &[u8]) -> Self {
        let mut bytes = prefix.to_vec();
        bytes.extend_from_slice(public_key);

        Self(format!(
            "did:{KEY_METHOD}:{}",
            multibase::encode(Base::Base58Btc, bytes)
        ))
    }

    /// Returns the method name, e.g. `key` for `did:key:z6Mk...`.
    pub fn method(&self) -> &str {
        self.parts().0
    }

    /// Returns the method-specific part of the identifier.
    pub fn method_specific_id(&self) -> &str {
        self.parts().1
    }

    /// Decodes the multicodec-prefixed key bytes of a `did:key` identifier.
    pub fn multicodec_key(&self) -> DidResult<Vec<u8>> {
        if self.method() != KEY_METHOD {
            return Err(DidError::UnsupportedMethod(self.0.clone()));
        }

        let (_, bytes) = multibase::decode(self.method_specific_id())?;
        Ok(bytes)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parts(&self) -> (&str, &str) {
        // Validated on construction: `did:<method>:<id>`.
        let rest = &self.0[4..];
        rest.split_once(':').unwrap_or((rest, ""))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the multicodec prefix of the public keys of `key_type`.
pub fn multicodec_prefix(key_type: KeyType) -> &'static [u8] {
    match key_type {
        KeyType::Ed25519 => &ED25519_PUB_KEY_CODE.1,
        KeyType::Rsa => &RSA_PUB_KEY_CODE.1,
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !RE_DID.is_match(s) {
            return Err(DidError::InvalidDid(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl Serialize for Did {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
