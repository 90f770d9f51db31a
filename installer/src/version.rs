//! Go SDK version parsing and canonicalisation.
//!
//! Versions are accepted with or without a leading `v`, with two or three
//! numeric components (`1.16`, `v1.17.1`), and optionally carry semver
//! pre-release or build metadata. The canonical form drops the prefix but keeps
//! the number of components the release uses, because that string doubles as
//! the install directory name and as the version segment of the archive name.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors arising from invalid version strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The input is not a semantic version.
    #[error("invalid version \"{input}\": {reason}")]
    Invalid {
        /// The rejected input.
        input: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// A canonical Go SDK version string.
///
/// Equality is string equality on the canonical form. Values parsed with
/// [`Version::parse`] are always well formed; values read back from an
/// install root via [`Version::from_canonical`] are taken verbatim.
///
/// # Examples
///
/// ```
/// use gosdk::version::Version;
///
/// let version = Version::parse("v1.17.1").expect("valid version");
/// assert_eq!(version.as_str(), "1.17.1");
///
/// let short = Version::parse("1.16").expect("valid version");
/// assert_eq!(short.to_string(), "1.16");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Parse and canonicalise a user-supplied version string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Invalid`] when the input does not have two or
    /// three numeric components or is otherwise not a semantic version.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let parsed = ParsedVersion::parse(input)?;
        Ok(Self(parsed.canonical()))
    }

    /// Wrap a string that is already in canonical form.
    ///
    /// Install directories are named after canonical versions, so names read
    /// back from the install root are not re-parsed.
    #[must_use]
    pub fn from_canonical(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the canonical string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the bare numeric form without any leading `v`.
    ///
    /// ```
    /// use gosdk::version::Version;
    ///
    /// assert_eq!(Version::from_canonical("v1.16").number(), "1.16");
    /// ```
    #[must_use]
    pub fn number(&self) -> &str {
        self.0.strip_prefix('v').unwrap_or(&self.0)
    }

    /// Return the semver value used for ordering, if this version is well
    /// formed.
    ///
    /// Two-component versions order as if their patch component were `0`.
    #[must_use]
    pub fn precedence(&self) -> Option<semver::Version> {
        ParsedVersion::parse(&self.0).ok().map(|parsed| parsed.semver)
    }

    /// Compare two versions by semver precedence.
    ///
    /// Malformed versions sort after well-formed ones and amongst themselves
    /// by their canonical strings.
    #[must_use]
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        match (self.precedence(), other.precedence()) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Version {
    type Error = VersionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// A validated version together with the component count the input used.
struct ParsedVersion {
    semver: semver::Version,
    has_patch: bool,
}

impl ParsedVersion {
    fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = |reason: String| VersionError::Invalid {
            input: input.to_owned(),
            reason,
        };

        let trimmed = input.trim();
        let bare = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let suffix_start = bare.find(['-', '+']).unwrap_or(bare.len());
        let (core, suffix) = bare.split_at(suffix_start);
        let components = core.split('.').count();

        let padded = match components {
            2 => format!("{core}.0{suffix}"),
            3 => bare.to_owned(),
            n => {
                return Err(invalid(format!(
                    "expected 2 or 3 numeric components, found {n}"
                )));
            }
        };

        let semver = semver::Version::parse(&padded).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            semver,
            has_patch: components == 3,
        })
    }

    fn canonical(&self) -> String {
        if self.has_patch {
            return self.semver.to_string();
        }

        let mut out = format!("{}.{}", self.semver.major, self.semver.minor);
        if !self.semver.pre.is_empty() {
            out.push('-');
            out.push_str(self.semver.pre.as_str());
        }
        if !self.semver.build.is_empty() {
            out.push('+');
            out.push_str(self.semver.build.as_str());
        }
        out
    }
}
