//! Release version grammar and ordering.
//!
//! A release directory name is a version when it matches
//! `MAJOR.MINOR[.PATCH][(a|b)N]` with every number spelled without leading
//! zeros. Only canonical spellings are accepted, so a version's string form is
//! always the exact directory name it was read from.
//!
//! Ordering is numeric per component. A missing patch compares as zero, and a
//! pre-release (`a` before `b`, then by number) sorts before the same numeric
//! version without one: `1.0b3 < 1.0 < 1.1`. `1.0` and `1.0.0` are distinct
//! names; the explicit patch sorts after the implicit one.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use thiserror::Error;

static VERSION_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(?:\.(0|[1-9][0-9]*))?(?:([ab])(0|[1-9][0-9]*))?$",
    )
    .unwrap()
});

/// A name that does not follow the version grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version '{0}'")]
pub struct ParseVersionError(pub String);

/// Pre-release marker. Alphas sort before betas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha(u64),
    Beta(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: Option<u64>,
    pub pre: Option<PreRelease>,
}

impl Version {
    /// Parse a directory name, returning `None` for anything that is not a version.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseVersionError(s.to_string());
        let caps = VERSION_RE.captures(s).ok_or_else(invalid)?;
        let number = |idx: usize| -> Result<Option<u64>, ParseVersionError> {
            caps.get(idx)
                .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
                .transpose()
        };

        let major = number(1)?.ok_or_else(invalid)?;
        let minor = number(2)?.ok_or_else(invalid)?;
        let patch = number(3)?;
        let pre = match (caps.get(4).map(|m| m.as_str()), number(5)?) {
            (Some("a"), Some(n)) => Some(PreRelease::Alpha(n)),
            (Some("b"), Some(n)) => Some(PreRelease::Beta(n)),
            (None, None) => None,
            _ => return Err(invalid()),
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        match self.pre {
            Some(PreRelease::Alpha(n)) => write!(f, "a{n}"),
            Some(PreRelease::Beta(n)) => write!(f, "b{n}"),
            None => Ok(()),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let numeric = |v: &Version| (v.major, v.minor, v.patch.unwrap_or(0));
        numeric(self)
            .cmp(&numeric(other))
            .then_with(|| match (self.pre, other.pre) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            })
            .then_with(|| self.patch.is_some().cmp(&other.patch.is_some()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
