use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A single fact record: an opaque JSON object.
pub type Fact = Map<String, Value>;

/// Facts flattened into one key-value map.
pub type FactMap = BTreeMap<String, Value>;

/// The ordered fact records carried by a UCAN token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UcanFacts(Vec<Fact>);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanFacts {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fact record.
    pub fn push(&mut self, fact: Fact) {
        self.0.push(fact);
    }

    /// Iterates over the records in order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.0.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow-merges the records into one map. Later records overwrite earlier ones.
    pub fn merged(&self) -> FactMap {
        self.0
            .iter()
            .flat_map(|fact| fact.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromIterator<Fact> for UcanFacts {
    fn from_iter<T: IntoIterator<Item = Fact>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fact(value: Value) -> Fact {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test_log::test]
    fn test_ucan_facts_serde() -> anyhow::Result<()> {
        let facts: UcanFacts = [fact(json!({"app": "notes"})), fact(json!({"v": 1}))]
            .into_iter()
            .collect();

        let serialized = serde_json::to_string(&facts)?;
        tracing::debug!(?serialized);
        assert_eq!(serialized, r#"[{"app":"notes"},{"v":1}]"#);

        let deserialized: UcanFacts = serde_json::from_str(&serialized)?;
        assert_eq!(facts, deserialized);

        Ok(())
    }

    #[test]
    fn test_ucan_facts_merged_later_record_wins() {
        let facts: UcanFacts = [
            fact(json!({"a": 1, "b": 1})),
            fact(json!({"b": 2})),
        ]
        .into_iter()
        .collect();

        let merged = facts.merged();
        assert_eq!(merged.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("b"), Some(&json!(2)));
    }
}
