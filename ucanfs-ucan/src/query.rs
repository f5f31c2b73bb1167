use std::{fmt::Display, str::FromStr};

use base64::prelude::{Engine, BASE64_STANDARD};
use serde::{Deserialize, Serialize};

use crate::{Ability, PathSegment, UcanError, UcanResult, FS_NAMESPACE, PATH_SEPARATOR};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The abilities a file system query may ask for.
pub const ALLOWED_FS_ABILITIES: [&str; 5] = ["read", "append", "delete", "overwrite", "*"];

/// The scheme of account capabilities.
pub const ACCOUNT_SCHEME: &str = "account";

/// The namespace of account abilities.
pub const ACCOUNT_NAMESPACE: &str = "account";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A request for access that an application hands to the principal holding the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query")]
pub enum Query {
    /// Access to the account itself, e.g. publishing its data root.
    #[serde(rename = "account")]
    Account,

    /// Access to a part of the file system.
    #[serde(rename = "fileSystem")]
    FileSystem(FileSystemQuery),
}

/// The top-level branch of a file system path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Unencrypted content.
    Public,

    /// Encrypted content.
    Private,
}

/// A request for an `fs` ability on a partitioned file system path.
///
/// The path is kept in its POSIX form; a trailing `/` marks a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFileSystemQuery", into = "RawFileSystemQuery")]
pub struct FileSystemQuery {
    ability: String,
    partition: Partition,
    segments: Vec<String>,
    directory: bool,
    key: Option<Vec<u8>>,
}

#[derive(Serialize, Deserialize)]
struct RawFileSystemQuery {
    ability: String,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Query {
    /// Decodes a query from JSON, rejecting disallowed abilities and unpartitioned paths.
    pub fn from_json(json: &str) -> UcanResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encodes the query as JSON.
    pub fn to_json(&self) -> UcanResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl FileSystemQuery {
    /// Creates a query for `ability` on the POSIX `path`.
    pub fn new(ability: impl Into<String>, path: impl AsRef<str>) -> UcanResult<Self> {
        let ability = ability.into();
        if !ALLOWED_FS_ABILITIES.contains(&ability.as_str()) {
            return Err(UcanError::InvalidQuery(format!(
                "ability `{ability}` is not allowed, expected one of: {}",
                ALLOWED_FS_ABILITIES.join(", ")
            )));
        }

        let path = path.as_ref();
        let directory = path.ends_with(PATH_SEPARATOR);
        let mut segments = path
            .split(PATH_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let partition = match segments.next().as_deref() {
            Some("public") => Partition::Public,
            Some("private") => Partition::Private,
            _ => {
                return Err(UcanError::InvalidQuery(format!(
                    "expected a path in the public or private partition, got: {path}"
                )))
            }
        };

        Ok(Self {
            ability,
            partition,
            segments: segments.collect(),
            directory,
            key: None,
        })
    }

    /// Attaches the key needed to read a private path.
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Returns the requested ability name.
    pub fn ability_name(&self) -> &str {
        &self.ability
    }

    /// Returns the requested ability in the `fs` namespace.
    pub fn ability(&self) -> UcanResult<Ability> {
        Ability::scoped(FS_NAMESPACE, [&self.ability])
    }

    /// Returns the partition the path lives in.
    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Returns the full path segments, starting with the partition name.
    pub fn path_segments(&self) -> Vec<&str> {
        std::iter::once(self.partition.as_str())
            .chain(self.segments.iter().map(String::as_str))
            .collect()
    }

    /// Returns `true` if the path names a directory.
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    /// Returns the path in POSIX form.
    pub fn posix_path(&self) -> String {
        let mut path = self.path_segments().join("/");
        if self.directory {
            path.push(PATH_SEPARATOR);
        }

        path
    }

    /// Returns the attached key.
    pub fn key(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }
}

impl Partition {
    /// Returns the partition's path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns `account/*`, the ability an account query asks for.
pub fn account_ability() -> Ability {
    Ability::Scoped {
        namespace: ACCOUNT_NAMESPACE.to_string(),
        segments: vec![PathSegment::Wildcard],
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl TryFrom<RawFileSystemQuery> for FileSystemQuery {
    type Error = UcanError;

    fn try_from(raw: RawFileSystemQuery) -> Result<Self, Self::Error> {
        let query = Self::new(raw.ability, raw.path)?;
        match raw.key {
            Some(key) => Ok(query.with_key(BASE64_STANDARD.decode(key)?)),
            None => Ok(query),
        }
    }
}

impl From<FileSystemQuery> for RawFileSystemQuery {
    fn from(query: FileSystemQuery) -> Self {
        Self {
            path: query.posix_path(),
            key: query.key.as_ref().map(|k| BASE64_STANDARD.encode(k)),
            ability: query.ability,
        }
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Query {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
