use std::{fmt::Display, str::FromStr};

use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};

use crate::{UcanError, UcanResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Represents the character used to separate path segments in an ability.
pub const PATH_SEPARATOR: char = '/';

/// Represents all possible abilities in the hierarchical level it is used, e.g. `fs/*`. On its
/// own it is the superuser ability.
pub const WILDCARD: &str = "*";

/// The namespace of file system abilities.
pub const FS_NAMESPACE: &str = "fs";

/// The file system abilities, weakest first. Each one permits the ones before it.
pub const FS_ABILITY_LEVELS: [&str; 5] = ["read", "append", "delete", "overwrite", WILDCARD];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An action a capability grants on a resource.
///
/// Either the superuser ability `*`, which permits everything, or a namespaced path such as
/// `fs/read` or `account/*`. Abilities are case-insensitive.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug, Hash)]
pub enum Ability {
    /// Full control over the resource.
    Superuser,

    /// An ability within a namespace, such as `fs/append`.
    Scoped {
        /// The namespace, e.g. `fs`.
        namespace: String,

        /// The segments after the namespace, at least one.
        segments: Vec<PathSegment>,
    },
}

/// A segment in an ability path. The segment is case-insensitive.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug, Hash)]
pub enum PathSegment {
    /// A specific segment, stored lowercase.
    Segment(String),

    /// Represents a wildcard segment in a path, which is `*`.
    Wildcard,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Ability {
    /// Creates a namespaced ability from a namespace and its segments.
    pub fn scoped<T>(
        namespace: impl AsRef<str>,
        segments: impl IntoIterator<Item = T>,
    ) -> UcanResult<Self>
    where
        T: AsRef<str>,
    {
        let namespace = namespace.as_ref().to_lowercase();
        if namespace.is_empty() || namespace == WILDCARD || namespace.contains(PATH_SEPARATOR) {
            return Err(UcanError::InvalidAbility(namespace));
        }

        let segments = segments
            .into_iter()
            .map(|s| s.as_ref().parse())
            .collect::<UcanResult<Vec<PathSegment>>>()?;

        if segments.is_empty() {
            return Err(UcanError::InvalidAbility(format!("{namespace}/<empty>")));
        }

        Ok(Self::Scoped {
            namespace,
            segments,
        })
    }

    /// Creates a file system ability such as `fs/read`.
    pub fn fs(ability: impl AsRef<str>) -> UcanResult<Self> {
        Self::scoped(FS_NAMESPACE, [ability])
    }

    /// Returns the namespace, or `None` for the superuser ability.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Superuser => None,
            Self::Scoped { namespace, .. } => Some(namespace),
        }
    }

    /// Checks if the ability is the superuser ability.
    pub fn is_superuser(&self) -> bool {
        matches!(self, Self::Superuser)
    }

    /// Returns the position of a file system ability in [`FS_ABILITY_LEVELS`].
    pub fn fs_level(&self) -> Option<usize> {
        match self {
            Self::Scoped {
                namespace,
                segments,
            } if namespace == FS_NAMESPACE && segments.len() == 1 => {
                let segment = segments[0].to_string();
                FS_ABILITY_LEVELS.iter().position(|l| *l == segment)
            }
            _ => None,
        }
    }

    /// Checks if the `requested` ability is permitted by this ability.
    ///
    /// The superuser ability permits everything. File system abilities compare by level, so
    /// `fs/overwrite` permits `fs/delete`, `fs/append` and `fs/read`. Any other pair in the same
    /// namespace must match segment by segment, where a `*` segment permits whatever follows.
    pub fn permits(&self, requested: &Ability) -> bool {
        match (self, requested) {
            (Self::Superuser, _) => true,
            (
                Self::Scoped {
                    namespace,
                    segments,
                },
                Self::Scoped {
                    namespace: requested_namespace,
                    segments: requested_segments,
                },
            ) => {
                if namespace != requested_namespace {
                    return false;
                }

                if let (Some(level), Some(requested_level)) =
                    (self.fs_level(), requested.fs_level())
                {
                    return level >= requested_level;
                }

                for items in segments.iter().zip_longest(requested_segments.iter()) {
                    match items {
                        EitherOrBoth::Both(PathSegment::Wildcard, _) => return true,
                        EitherOrBoth::Both(segment, requested_segment)
                            if segment == requested_segment => {}
                        _ => return false,
                    }
                }

                true
            }
            _ => false,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Superuser => write!(f, "{WILDCARD}"),
            Self::Scoped {
                namespace,
                segments,
            } => {
                write!(f, "{namespace}")?;
                for segment in segments {
                    write!(f, "{PATH_SEPARATOR}{segment}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Ability {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == WILDCARD {
            return Ok(Self::Superuser);
        }

        match s.split_once(PATH_SEPARATOR) {
            Some((namespace, rest)) => Self::scoped(namespace, rest.split(PATH_SEPARATOR)),
            None => Err(UcanError::InvalidAbility(s.to_string())),
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Segment(segment) => write!(f, "{segment}"),
            Self::Wildcard => write!(f, "{WILDCARD}"),
        }
    }
}

impl FromStr for PathSegment {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == WILDCARD {
            return Ok(Self::Wildcard);
        }

        if s.is_empty() || s.contains(PATH_SEPARATOR) || s.contains(char::is_whitespace) {
            return Err(UcanError::InvalidAbility(s.to_string()));
        }

        Ok(Self::Segment(s.to_lowercase()))
    }
}

impl Serialize for Ability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ability {
    fn deserialize<D>(deserializer: D) -> Result<Ability, D::Error>
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
