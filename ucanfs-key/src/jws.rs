use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::KeyError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// JSON Web Signature (JWS) algorithm.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum JwsAlgorithm {
    /// EdDSA algorithm.
    #[serde(rename = "EdDSA")]
    EdDSA,

    /// RSASSA-PKCS1-v1_5 using SHA-256.
    #[serde(rename = "RS256")]
    RS256,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for JwsAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwsAlgorithm::EdDSA => write!(f, "EdDSA"),
            JwsAlgorithm::RS256 => write!(f, "RS256"),
        }
    }
}

impl FromStr for JwsAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EdDSA" => Ok(JwsAlgorithm::EdDSA),
            "RS256" => Ok(JwsAlgorithm::RS256),
            s => Err(KeyError::UnsupportedJwsAlgName(s.to_string())),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
