use serde::{Deserialize, Serialize};

use crate::{Ability, ResourcePointer, UcanResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A grant of an [`Ability`] on a [`ResourcePointer`].
///
/// Encoded as `{"with": "<resource>", "can": "<ability>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capability {
    /// The resource the capability applies to.
    #[serde(rename = "with")]
    pub resource: ResourcePointer,

    /// What may be done with the resource.
    #[serde(rename = "can")]
    pub ability: Ability,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Capability {
    /// Creates a capability.
    pub fn new(resource: ResourcePointer, ability: Ability) -> Self {
        Self { resource, ability }
    }

    /// Parses a capability from its resource and ability strings.
    pub fn parse(resource: impl AsRef<str>, ability: impl AsRef<str>) -> UcanResult<Self> {
        Ok(Self {
            resource: resource.as_ref().parse()?,
            ability: ability.as_ref().parse()?,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_capability_serde() -> anyhow::Result<()> {
        let capability = Capability::parse("wnfs://did:key:zAlice/public", "fs/append")?;

        let serialized = serde_json::to_string(&capability)?;
        tracing::debug!(?serialized);
        assert_eq!(
            serialized,
            r#"{"with":"wnfs://did:key:zAlice/public","can":"fs/append"}"#
        );

        let deserialized: Capability = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, capability);

        assert!(serde_json::from_str::<Capability>(r#"{"with":"wnfs://x","can":"fs"}"#).is_err());

        Ok(())
    }
}
