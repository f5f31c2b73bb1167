use std::{fmt::Display, str::FromStr};

use libipld::Cid;
use serde::{Deserialize, Serialize};

use crate::{content_id, Ucan, UcanError};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A reference from a token to one of its proofs.
///
/// On the wire a proof is a string: either the CID of an encoded token or the encoded token itself.
/// An encoded token always contains `.`, which never appears in a CID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProofReference {
    /// The proof is looked up by content id.
    Cid(Cid),

    /// The proof is embedded as an encoded token.
    Inline(String),
}

/// The ordered proof references of a UCAN token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UcanProofs(Vec<ProofReference>);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ProofReference {
    /// Returns the content id of the referenced token.
    pub fn content_id(&self) -> Cid {
        match self {
            Self::Cid(cid) => *cid,
            Self::Inline(encoded) => content_id(encoded),
        }
    }
}

impl UcanProofs {
    /// Iterates over the references in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ProofReference> {
        self.0.iter()
    }

    /// Returns the first reference.
    pub fn first(&self) -> Option<&ProofReference> {
        self.0.first()
    }

    /// Returns the number of references.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no references.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for ProofReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cid(cid) => write!(f, "{cid}"),
            Self::Inline(encoded) => write!(f, "{encoded}"),
        }
    }
}

impl FromStr for ProofReference {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(UcanError::InvalidProofReference(s.to_string()));
        }

        if s.contains('.') {
            return Ok(Self::Inline(s.to_string()));
        }

        Cid::try_from(s)
            .map(Self::Cid)
            .map_err(|e| UcanError::InvalidProofReference(format!("{s}: {e}")))
    }
}

impl Serialize for ProofReference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProofReference {
    fn deserialize<D>(deserializer: D) -> Result<ProofReference, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<Cid> for ProofReference {
    fn from(cid: Cid) -> Self {
        Self::Cid(cid)
    }
}

impl From<&Ucan> for ProofReference {
    fn from(ucan: &Ucan) -> Self {
        Self::Cid(ucan.cid())
    }
}

impl FromIterator<ProofReference> for UcanProofs {
    fn from_iter<T: IntoIterator<Item = ProofReference>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_proof_reference_parse() -> anyhow::Result<()> {
        let cid = content_id("a.b.c");

        let reference: ProofReference = cid.to_string().parse()?;
        assert_eq!(reference, ProofReference::Cid(cid));
        assert_eq!(reference.content_id(), cid);

        let inline: ProofReference = "a.b.c".parse()?;
        assert_eq!(inline, ProofReference::Inline("a.b.c".to_string()));
        assert_eq!(inline.content_id(), cid);

        assert!("".parse::<ProofReference>().is_err());
        assert!("not-a-cid".parse::<ProofReference>().is_err());

        let proofs: UcanProofs = [reference, inline].into_iter().collect();
        let serialized = serde_json::to_string(&proofs)?;
        tracing::debug!(?serialized);
        assert_eq!(serialized, format!(r#"["{cid}","a.b.c"]"#));
        assert_eq!(serde_json::from_str::<UcanProofs>(&serialized)?, proofs);

        Ok(())
    }
}
