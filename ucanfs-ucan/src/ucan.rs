use std::{fmt::Display, str::FromStr};

use libipld::Cid;
use multihash::{Code, MultihashDigest};
use serde::{Deserialize, Serialize};
use ucanfs_did::Did;

use crate::{
    Capability, UcanBuilder, UcanError, UcanFacts, UcanHeader, UcanPayload, UcanProofs,
    UcanResult, UcanSignature,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The multicodec code of raw binary content, used for token CIDs.
pub const RAW_CODEC: u64 = 0x55;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A signed [UCAN (User-Controlled Authorization Network)][ucan] token.
///
/// The token keeps the exact `header.payload` string its signature was made over, so encoding a
/// decoded token reproduces the original bytes regardless of how its JSON was laid out.
///
/// [ucan]: https://github.com/ucan-wg/spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ucan {
    header: UcanHeader,
    payload: UcanPayload,
    signed_data: String,
    signature: UcanSignature,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Ucan {
    /// Creates a convenience builder for constructing a new UCAN.
    pub fn builder() -> UcanBuilder {
        UcanBuilder::default()
    }

    pub(crate) fn from_parts(
        header: UcanHeader,
        payload: UcanPayload,
        signed_data: String,
        signature: UcanSignature,
    ) -> Self {
        Self {
            header,
            payload,
            signed_data,
            signature,
        }
    }

    /// Decodes a token from its `header.payload.signature` form.
    ///
    /// Any structural problem is reported as [`UcanError::MalformedToken`].
    pub fn decode(encoded: &str) -> UcanResult<Self> {
        let parts: Vec<&str> = encoded.split('.').collect();

        let [header, payload, signature] = parts.as_slice() else {
            return Err(UcanError::MalformedToken(format!(
                "expected 3 dot-separated parts, got {}",
                parts.len()
            )));
        };

        let malformed = |part: &str, e: UcanError| UcanError::MalformedToken(format!("{part}: {e}"));

        Ok(Self {
            header: header.parse().map_err(|e| malformed("header", e))?,
            payload: payload.parse().map_err(|e| malformed("payload", e))?,
            signature: signature.parse().map_err(|e| malformed("signature", e))?,
            signed_data: format!("{header}.{payload}"),
        })
    }

    /// Encodes the token as `header.payload.signature`.
    pub fn encode(&self) -> String {
        format!("{}.{}", self.signed_data, self.signature)
    }

    /// Returns the content id of the encoded token.
    pub fn cid(&self) -> Cid {
        content_id(&self.encode())
    }

    /// Returns the header.
    pub fn header(&self) -> &UcanHeader {
        &self.header
    }

    /// Returns the payload.
    pub fn payload(&self) -> &UcanPayload {
        &self.payload
    }

    /// Returns the signature.
    pub fn signature(&self) -> &UcanSignature {
        &self.signature
    }

    /// Returns the `header.payload` string the signature covers.
    pub fn signed_data(&self) -> &str {
        &self.signed_data
    }

    /// Returns the issuer.
    pub fn issuer(&self) -> &Did {
        &self.payload.issuer
    }

    /// Returns the audience.
    pub fn audience(&self) -> &Did {
        &self.payload.audience
    }

    /// Returns the granted capabilities.
    pub fn attenuations(&self) -> &[Capability] {
        &self.payload.attenuations
    }

    /// Returns the facts.
    pub fn facts(&self) -> &UcanFacts {
        &self.payload.facts
    }

    /// Returns the proof references.
    pub fn proofs(&self) -> &UcanProofs {
        &self.payload.proofs
    }

    /// Returns the expiration time.
    pub fn expiration(&self) -> Option<u64> {
        self.payload.expiration
    }

    /// Returns the not-before time.
    pub fn not_before(&self) -> Option<u64> {
        self.payload.not_before
    }

    /// Returns the nonce.
    pub fn nonce(&self) -> Option<&str> {
        self.payload.nonce.as_deref()
    }

    /// Checks if the token is addressed to its own issuer.
    ///
    /// Such a token is a root of authority: it grants nothing beyond its own attenuations.
    pub fn is_self_issued(&self) -> bool {
        self.payload.issuer == self.payload.audience
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Computes the content id of an encoded token: a CIDv1 with the raw codec over its SHA-256 hash.
pub fn content_id(encoded: &str) -> Cid {
    Cid::new_v1(RAW_CODEC, Code::Sha2_256.digest(encoded.as_bytes()))
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Ucan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.signed_data, self.signature)
    }
}

impl FromStr for Ucan {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Ucan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ucan {
    fn deserialize<D>(deserializer: D) -> Result<Ucan, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ucan::decode(&s).map_err(serde::de::Error::custom)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use base64::prelude::{Engine, BASE64_URL_SAFE_NO_PAD};
    use ucanfs_key::{Ed25519KeyPair, KeyPairGenerate};

    use crate::caps;

    use super::*;

    #[test_log::test]
    fn test_ucan_encode_decode() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let alice = Ed25519KeyPair::generate(&mut rng)?;
        let bob = Did::from_key(&Ed25519KeyPair::generate(&mut rng)?)?;
        let alice_did = Did::from_key(&alice)?;

        let proof = Ucan::builder()
            .audience(alice_did.clone())
            .capabilities(caps! { format!("wnfs://{alice_did}/*") => ["*"] }?)
            .sign(&alice)?;

        let ucan = Ucan::builder()
            .audience(bob.clone())
            .capabilities(caps! { format!("wnfs://{alice_did}/public") => ["fs/read"] }?)
            .proofs([proof.cid()])
            .not_before(UNIX_EPOCH + Duration::from_secs(10))
            .nonce("1100263a4012")
            .sign(&alice)?;

        let encoded = ucan.encode();
        tracing::debug!(?encoded);
        assert_eq!(encoded.split('.').count(), 3);
        assert_eq!(ucan.to_string(), encoded);

        let decoded = Ucan::decode(&encoded)?;
        assert_eq!(decoded, ucan);
        assert_eq!(decoded.issuer(), &alice_did);
        assert_eq!(decoded.audience(), &bob);
        assert_eq!(decoded.attenuations(), ucan.attenuations());
        assert_eq!(decoded.proofs().first(), Some(&proof.cid().into()));
        assert_eq!(decoded.signature(), ucan.signature());
        assert_eq!(decoded.not_before(), Some(10));
        assert_eq!(decoded.nonce(), Some("1100263a4012"));
        assert_eq!(decoded.cid(), ucan.cid());

        assert!(proof.is_self_issued());
        assert!(!ucan.is_self_issued());

        Ok(())
    }

    #[test]
    fn test_ucan_decode_keeps_signed_bytes() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let alice = Ed25519KeyPair::generate(&mut rng)?;
        let alice_did = Did::from_key(&alice)?;

        // Same payload, different JSON layout than this crate would produce.
        let payload = format!(
            r#"{{ "att": [], "aud": "{alice_did}", "iss": "{alice_did}", "prf": [] }}"#
        );
        let header = BASE64_URL_SAFE_NO_PAD.encode(r#"{"typ":"JWT","alg":"EdDSA"}"#);
        let payload = BASE64_URL_SAFE_NO_PAD.encode(payload);
        let encoded = format!("{header}.{payload}.AAAA");

        let decoded = Ucan::decode(&encoded)?;
        assert_eq!(decoded.encode(), encoded);
        assert_eq!(decoded.signed_data(), format!("{header}.{payload}"));

        Ok(())
    }

    #[test]
    fn test_ucan_decode_malformed() {
        for encoded in ["", "a.b", "a.b.c.d", "!!.!!.!!"] {
            assert!(
                matches!(Ucan::decode(encoded), Err(UcanError::MalformedToken(_))),
                "{encoded}"
            );
        }
    }

    #[test]
    fn test_ucan_content_id() {
        let cid = content_id("a.b.c");
        assert_eq!(cid.codec(), RAW_CODEC);
        assert_eq!(cid.hash().code(), u64::from(Code::Sha2_256));
        assert_eq!(cid, content_id("a.b.c"));
        assert_ne!(cid, content_id("a.b.d"));
    }
}
