use std::{fmt::Display, str::FromStr};

use base64::prelude::{Engine, BASE64_URL_SAFE_NO_PAD};

use crate::UcanError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The raw signature bytes of a UCAN token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UcanSignature(Vec<u8>);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanSignature {
    /// Returns the signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for UcanSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", BASE64_URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl FromStr for UcanSignature {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(BASE64_URL_SAFE_NO_PAD.decode(s.as_bytes())?))
    }
}

impl From<Vec<u8>> for UcanSignature {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for UcanSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
