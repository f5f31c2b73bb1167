use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::KeyError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A key pair with a public and private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricKey<P, S> {
    pub(crate) public: P,
    pub(crate) private: S,
}

/// A public key.
pub type PubKey<P> = AsymmetricKey<P, ()>;

/// Supported key types.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// An `ed25519` key
    #[serde(rename = "ed25519")]
    Ed25519,

    /// An `RSA` key
    #[serde(rename = "rsa")]
    Rsa,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl KeyType {
    /// Returns the tag the key type is registered under.
    pub fn tag(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Rsa => "rsa",
        }
    }
}

impl<P, S> AsymmetricKey<P, S> {
    /// Returns the public half of the key.
    pub fn public(&self) -> &P {
        &self.public
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for KeyType {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(KeyType::Ed25519),
            "rsa" => Ok(KeyType::Rsa),
            s => Err(KeyError::UnsupportedKeyType(s.to_string())),
        }
    }
}
