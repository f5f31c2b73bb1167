use std::{fmt::Display, str::FromStr};

use base64::prelude::{Engine, BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use ucanfs_did::Did;

use crate::{Capability, UcanError, UcanFacts, UcanProofs, UcanResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The payload of a UCAN token: who delegates what to whom, when, and on what authority.
///
/// Times are Unix timestamps in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UcanPayload {
    /// The principal that issued and signed the token.
    #[serde(rename = "iss")]
    pub issuer: Did,

    /// The principal the capabilities are delegated to.
    #[serde(rename = "aud")]
    pub audience: Did,

    /// The time at and after which the token is no longer valid.
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u64>,

    /// The time before which the token is not yet valid.
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<u64>,

    /// A nonce that makes otherwise identical tokens distinct.
    #[serde(rename = "nnc", default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Additional facts asserted by the issuer.
    #[serde(rename = "fct", default, skip_serializing_if = "UcanFacts::is_empty")]
    pub facts: UcanFacts,

    /// The capabilities granted to the audience.
    #[serde(rename = "att")]
    pub attenuations: Vec<Capability>,

    /// The tokens the issuer's authority derives from.
    #[serde(rename = "prf", default)]
    pub proofs: UcanProofs,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanPayload {
    /// Encodes the payload as base64url JSON.
    pub fn encode(&self) -> UcanResult<String> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for UcanPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = self.encode().map_err(|_| std::fmt::Error)?;
        write!(f, "{}", encoded)
    }
}

impl FromStr for UcanPayload {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = BASE64_URL_SAFE_NO_PAD.decode(s.as_bytes())?;
        serde_json::from_slice(&decoded).map_err(UcanError::from)
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
    fn test_payload_wire_keys() -> anyhow::Result<()> {
        let json = r#"{
            "iss": "did:key:zAlice",
            "aud": "did:key:zBob",
            "exp": 1700000000,
            "att": [{"with": "wnfs://did:key:zAlice/public", "can": "fs/read"}],
            "prf": []
        }"#;

        let payload: UcanPayload = serde_json::from_str(json)?;
        assert_eq!(payload.issuer.as_str(), "did:key:zAlice");
        assert_eq!(payload.expiration, Some(1_700_000_000));
        assert_eq!(payload.not_before, None);
        assert!(payload.facts.is_empty());
        assert_eq!(payload.attenuations.len(), 1);

        let value: Value = serde_json::to_value(&payload)?;
        tracing::debug!(?value);
        assert!(value.get("nbf").is_none());
        assert!(value.get("fct").is_none());
        assert_eq!(value["att"][0]["can"], "fs/read");

        let reparsed: UcanPayload = payload.to_string().parse()?;
        assert_eq!(reparsed, payload);

        Ok(())
    }

    #[test]
    fn test_payload_null_expiration() -> anyhow::Result<()> {
        let json = r#"{"iss":"did:key:zAlice","aud":"did:key:zBob","exp":null,"att":[]}"#;
        let payload: UcanPayload = serde_json::from_str(json)?;
        assert_eq!(payload.expiration, None);
        assert!(payload.proofs.is_empty());

        Ok(())
    }
}
