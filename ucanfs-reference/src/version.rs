use std::{fmt::Display, str::FromStr};

use crate::ReferenceError;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The version assumed for a file system that carries no version marker.
pub const UNMARKED_VERSION: SemVer = SemVer::new(1, 0, 0);

/// The file system version this crate reads and writes.
pub const LATEST_VERSION: SemVer = SemVer::new(2, 0, 0);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    /// Incompatible changes.
    pub major: u32,

    /// Compatible additions.
    pub minor: u32,

    /// Fixes.
    pub patch: u32,
}

/// An inclusive range of supported file system versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedVersions {
    min: SemVer,
    max: SemVer,
}

/// Where a version falls relative to a [`SupportedVersions`] range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// Within the range.
    Supported,

    /// Below the range.
    TooLow,

    /// Above the range.
    TooHigh,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SemVer {
    /// Creates a version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl SupportedVersions {
    /// Creates a range. Fails if `min` is above `max`.
    pub fn new(min: SemVer, max: SemVer) -> Result<Self, ReferenceError> {
        if min > max {
            return Err(ReferenceError::InvalidVersion(format!(
                "supported range {min}..={max} is empty"
            )));
        }

        Ok(Self { min, max })
    }

    /// Returns the lowest supported version.
    pub fn min(&self) -> SemVer {
        self.min
    }

    /// Returns the highest supported version.
    pub fn max(&self) -> SemVer {
        self.max
    }

    /// Places `version` relative to the range.
    pub fn support(&self, version: &SemVer) -> Support {
        if *version < self.min {
            Support::TooLow
        } else if *version > self.max {
            Support::TooHigh
        } else {
            Support::Supported
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for SupportedVersions {
    fn default() -> Self {
        Self {
            min: LATEST_VERSION,
            max: LATEST_VERSION,
        }
    }
}

impl Display for SemVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemVer {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReferenceError::InvalidVersion(s.to_string());

        let parts = s
            .trim()
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                part.parse::<u32>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(Self::new(*major, *minor, *patch)),
            _ => Err(invalid()),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
