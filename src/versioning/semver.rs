//! Version string codec.
//!
//! Parsing here is deliberately lenient: [`parse_parts`] never fails and
//! reads whatever numeric components it can find. Strict checking against
//! the semantic version grammar is done only by [`is_valid`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Full `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` grammar.
static SEMVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(?:-((?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    )
    .expect("semver pattern is a valid regex")
});

/// A non-negative version component of any size.
///
/// Stored as decimal digits without leading zeros and ordered by digit
/// count, then lexically, which matches numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionNumber(String);

impl VersionNumber {
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Reads a run of ASCII digits; anything else is zero.
    fn parse(raw: &str) -> Self {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Self::zero();
        }
        match raw.trim_start_matches('0') {
            "" => Self::zero(),
            digits => Self(digits.to_string()),
        }
    }

    /// The next integer, carrying into a new leading digit when needed.
    pub fn incremented(&self) -> Self {
        let mut digits = self.0.as_bytes().to_vec();
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
        Self(digits.into_iter().map(char::from).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VersionNumber {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for VersionNumber {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The numeric core of a version.
///
/// Ordering is lexicographic over `(major, minor, patch)`. Pre-release and
/// build metadata are not part of this type and play no role in ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionParts {
    pub major: VersionNumber,
    pub minor: VersionNumber,
    pub patch: VersionNumber,
}

impl VersionParts {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            patch: patch.into(),
        }
    }

    /// Returns the version that follows this one for the given bump.
    pub fn bumped(&self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::Major => Self {
                major: self.major.incremented(),
                ..Self::default()
            },
            BumpKind::Minor => Self {
                major: self.major.clone(),
                minor: self.minor.incremented(),
                patch: VersionNumber::zero(),
            },
            BumpKind::Patch => Self {
                patch: self.patch.incremented(),
                ..self.clone()
            },
        }
    }
}

impl fmt::Display for VersionParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Which version component an edit bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    /// Incompatible change to what the prompt asks for.
    Major,
    /// Backward compatible addition.
    Minor,
    /// Anything smaller, including re-runs of an unchanged prompt.
    Patch,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient conversion: anything other than `major` or `minor` is a patch.
impl From<&str> for BumpKind {
    fn from(label: &str) -> Self {
        match label {
            "major" => BumpKind::Major,
            "minor" => BumpKind::Minor,
            _ => BumpKind::Patch,
        }
    }
}

/// Reads the numeric `(major, minor, patch)` core of a version string.
///
/// Any `-prerelease` or `+build` suffix is dropped first. Missing or
/// non-numeric components become `0`, so this accepts any input.
///
/// ```
/// use chorus_cli::versioning::{parse_parts, VersionParts};
///
/// assert_eq!(parse_parts("1.0.0-alpha+001"), VersionParts::new(1, 0, 0));
/// assert_eq!(parse_parts("2.x.3"), VersionParts::new(2, 0, 3));
/// ```
pub fn parse_parts(version: &str) -> VersionParts {
    let core = version
        .split('-')
        .next()
        .unwrap_or_default()
        .split('+')
        .next()
        .unwrap_or_default();

    let mut components = core.split('.').map(VersionNumber::parse);
    VersionParts {
        major: components.next().unwrap_or_default(),
        minor: components.next().unwrap_or_default(),
        patch: components.next().unwrap_or_default(),
    }
}

/// Checks a version string against the full semantic version grammar.
///
/// Surrounding whitespace is ignored.
pub fn is_valid(version: &str) -> bool {
    let version = version.trim();
    !version.is_empty() && SEMVER_PATTERN.is_match(version)
}

/// Computes the next version string for `kind`.
///
/// Pre-release and build metadata on `current` are not carried over.
pub fn bump(current: &str, kind: BumpKind) -> String {
    parse_parts(current).bumped(kind).to_string()
}
