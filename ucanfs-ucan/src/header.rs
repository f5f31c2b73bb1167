use std::{fmt::Display, str::FromStr};

use base64::prelude::{Engine, BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use ucanfs_key::JwsAlgorithm;

use crate::{UcanError, UcanResult};

//--------------------------------------------------------------------------------------------------
// Constant
//--------------------------------------------------------------------------------------------------

/// Defines the type of the token as a JSON Web Token (JWT).
pub const TYPE: &str = "JWT";

/// The UCAN spec version written into new tokens.
pub const UCAN_VERSION: &str = "0.8.1";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The header part of a UCAN token, naming the signature algorithm and UCAN version.
///
/// The algorithm is kept as the name found on the wire. A token with an algorithm this crate does
/// not know still decodes; it just never validates.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UcanHeader {
    alg: String,
    ucv: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanHeader {
    /// Creates a header for the given algorithm name.
    pub fn new(alg: impl Into<String>) -> Self {
        Self {
            alg: alg.into(),
            ucv: UCAN_VERSION.to_string(),
        }
    }

    /// Returns the algorithm name used for signing the token.
    pub fn alg(&self) -> &str {
        &self.alg
    }

    /// Returns the algorithm if it is one of the known JWS algorithms.
    pub fn jws_alg(&self) -> Option<JwsAlgorithm> {
        self.alg.parse().ok()
    }

    /// Returns the UCAN version of the token.
    pub fn ucv(&self) -> &str {
        &self.ucv
    }

    /// Encodes the header as base64url JSON.
    pub fn encode(&self) -> UcanResult<String> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Serialize for UcanHeader {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde_json::json!({
            "alg": self.alg,
            "typ": TYPE,
            "ucv": self.ucv,
        })
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UcanHeader {
    fn deserialize<D>(deserializer: D) -> Result<UcanHeader, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Header {
            alg: String,
            typ: String,
            #[serde(default = "default_ucv")]
            ucv: String,
        }

        fn default_ucv() -> String {
            UCAN_VERSION.to_string()
        }

        let header = Header::deserialize(deserializer)?;

        if header.typ != TYPE {
            return Err(serde::de::Error::custom(UcanError::UnsupportedTokenType(
                header.typ,
            )));
        }

        Ok(UcanHeader {
            alg: header.alg,
            ucv: header.ucv,
        })
    }
}

impl Display for UcanHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = self.encode().map_err(|_| std::fmt::Error)?;
        write!(f, "{}", encoded)
    }
}

impl FromStr for UcanHeader {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = BASE64_URL_SAFE_NO_PAD.decode(s.as_bytes())?;
        serde_json::from_slice(&decoded).map_err(UcanError::from)
    }
}

impl From<JwsAlgorithm> for UcanHeader {
    fn from(alg: JwsAlgorithm) -> Self {
        Self::new(alg.to_string())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test_log::test]
    fn test_header_serde() -> anyhow::Result<()> {
        let header = UcanHeader::from(JwsAlgorithm::RS256);

        let serialized = serde_json::to_string(&header)?;
        tracing::debug!(?serialized);

        let value: Value = serde_json::from_str(&serialized)?;
        assert_eq!(value["alg"], "RS256");
        assert_eq!(value["typ"], "JWT");
        assert_eq!(value["ucv"], UCAN_VERSION);

        let deserialized: UcanHeader = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, header);
        assert_eq!(deserialized.jws_alg(), Some(JwsAlgorithm::RS256));

        Ok(())
    }

    #[test_log::test]
    fn test_header_display() -> anyhow::Result<()> {
        let header = UcanHeader::from(JwsAlgorithm::EdDSA);

        let displayed = header.to_string();
        tracing::debug!(?displayed);
        assert!(!displayed.contains('='));

        let parsed = UcanHeader::from_str(&displayed)?;
        assert_eq!(parsed, header);

        Ok(())
    }

    #[test]
    fn test_header_unknown_alg_and_wrong_type() -> anyhow::Result<()> {
        let header: UcanHeader = serde_json::from_str(r#"{"alg":"ES384","typ":"JWT"}"#)?;
        assert_eq!(header.alg(), "ES384");
        assert_eq!(header.jws_alg(), None);
        assert_eq!(header.ucv(), UCAN_VERSION);

        assert!(serde_json::from_str::<UcanHeader>(r#"{"alg":"EdDSA","typ":"JWS"}"#).is_err());

        Ok(())
    }
}
