use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use ucanfs_did::Did;

use crate::UcanError;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Separates the scheme from the hierarchical part of a resource pointer.
pub const SCHEME_SEPARATOR: &str = "://";

/// The scheme of file system resources.
pub const FS_SCHEME: &str = "wnfs";

/// A trailing path segment that stands for everything at its level.
const WILDCARD_SEGMENT: &str = "/*";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The resource a capability applies to, written `<scheme>://<hier-part>`.
///
/// For file system resources the hierarchical part is the owner's DID followed by a path, e.g.
/// `wnfs://did:key:z6Mk.../public/documents`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePointer {
    scheme: String,
    hier_part: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ResourcePointer {
    /// Creates a resource pointer. The scheme is case-insensitive and stored lowercase.
    pub fn new(scheme: impl AsRef<str>, hier_part: impl Into<String>) -> Self {
        Self {
            scheme: scheme.as_ref().to_lowercase(),
            hier_part: hier_part.into(),
        }
    }

    /// Creates a pointer to `segments` below the root of `did` under `scheme`.
    pub fn for_path<T>(scheme: impl AsRef<str>, did: &Did, segments: &[T]) -> Self
    where
        T: AsRef<str>,
    {
        Self::new(scheme, join_path(did, segments))
    }

    /// Returns the scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the hierarchical part.
    pub fn hier_part(&self) -> &str {
        &self.hier_part
    }

    /// Checks if the pointer addresses exactly `prefix` under `scheme`.
    ///
    /// `prefix`, `prefix/` and `prefix/*` all address the same level.
    pub fn addresses(&self, scheme: &str, prefix: &str) -> bool {
        if !self.scheme.eq_ignore_ascii_case(scheme) {
            return false;
        }

        // Only a whole `*` segment is a wildcard; `docs*` is a path of its own.
        let hier_part = self
            .hier_part
            .strip_suffix(WILDCARD_SEGMENT)
            .or_else(|| self.hier_part.strip_suffix('/'))
            .unwrap_or(&self.hier_part);

        hier_part == prefix
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Joins a DID and path segments into a hierarchical part. Empty segments are skipped.
pub fn join_path<T>(did: &Did, segments: &[T]) -> String
where
    T: AsRef<str>,
{
    let mut path = did.to_string();
    for segment in segments.iter().map(AsRef::as_ref).filter(|s| !s.is_empty()) {
        path.push('/');
        path.push_str(segment);
    }

    path
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for ResourcePointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{SCHEME_SEPARATOR}{}", self.scheme, self.hier_part)
    }
}

impl FromStr for ResourcePointer {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(SCHEME_SEPARATOR) {
            Some((scheme, hier_part))
                if !scheme.is_empty()
                    && !hier_part.is_empty()
                    && scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) =>
            {
                Ok(Self::new(scheme, hier_part))
            }
            _ => Err(UcanError::InvalidResource(s.to_string())),
        }
    }
}

impl Serialize for ResourcePointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourcePointer {
    fn deserialize<D>(deserializer: D) -> Result<ResourcePointer, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_pointer_parse() -> anyhow::Result<()> {
        let resource: ResourcePointer = "WNFS://did:key:zAlice/public/docs".parse()?;
        assert_eq!(resource.scheme(), "wnfs");
        assert_eq!(resource.hier_part(), "did:key:zAlice/public/docs");
        assert_eq!(resource.to_string(), "wnfs://did:key:zAlice/public/docs");

        assert!("did:key:zAlice".parse::<ResourcePointer>().is_err());
        assert!("://did:key:zAlice".parse::<ResourcePointer>().is_err());
        assert!("wnfs://".parse::<ResourcePointer>().is_err());

        Ok(())
    }

    #[test]
    fn test_resource_pointer_addresses() -> anyhow::Result<()> {
        let did: Did = "did:key:zAlice".parse()?;

        let root = join_path::<&str>(&did, &[]);
        let docs = join_path(&did, &["public", "", "docs"]);
        assert_eq!(docs, "did:key:zAlice/public/docs");

        for s in [
            "wnfs://did:key:zAlice",
            "wnfs://did:key:zAlice/",
            "wnfs://did:key:zAlice/*",
        ] {
            let resource: ResourcePointer = s.parse()?;
            assert!(resource.addresses("wnfs", &root), "{s}");
            assert!(!resource.addresses("wnfs", &docs), "{s}");
        }

        let resource = ResourcePointer::for_path(FS_SCHEME, &did, &["public", "docs"]);
        assert!(resource.addresses("wnfs", &docs));
        assert!(!resource.addresses("https", &docs));
        assert!(!resource.addresses("wnfs", &root));

        let public = join_path(&did, &["public"]);
        for s in ["wnfs://did:key:zAlice/public*", "wnfs://did:key:zAlice/public/*/"] {
            let resource: ResourcePointer = s.parse()?;
            assert!(!resource.addresses("wnfs", &public), "{s}");
        }

        let resource: ResourcePointer = "wnfs://did:key:zAlice/public*".parse()?;
        assert!(resource.addresses("wnfs", "did:key:zAlice/public*"));

        Ok(())
    }
}
