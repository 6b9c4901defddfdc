//! Package version handling, including the `vercmp`-style ordering algorithm used to decide
//! whether an installer upgrade is actually an upgrade.

use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;
use std::num::NonZeroUsize;
use std::str::FromStr;

use semver::Version as SemverVersion;

use crate::Error;
use crate::macros::regex_once;

/// An epoch of a package version.
///
/// Used to force a version to be considered newer than it otherwise would be, prepended to a
/// version and delimited by `:` (e.g. `1:` added to `0.10.0-1` forms `1:0.10.0-1`, which orders
/// newer than `1.0.0-1`).
///
/// An `Epoch` wraps a `usize` guaranteed to be greater than `0`.
///
/// ## Examples
/// ```
/// use pkg_types::Epoch;
///
/// assert!(Epoch::new("1".to_string()).is_ok());
/// assert!(Epoch::new("0".to_string()).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Epoch(NonZeroUsize);

impl Epoch {
    /// Creates a new [`Epoch`] from a string.
    pub fn new(epoch: String) -> Result<Self, Error> {
        match epoch.parse() {
            Ok(epoch) => Ok(Epoch(epoch)),
            Err(_) => Err(Error::InvalidVersion(epoch)),
        }
    }

    /// Returns the inner value.
    pub fn inner(&self) -> NonZeroUsize {
        self.0
    }
}

impl FromStr for Epoch {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Epoch::new(input.to_string())
    }
}

impl Display for Epoch {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

/// The build/release number of a package version.
///
/// Appended to a version and delimited by `-` (e.g. `-2` added to `1.0.0` forms `1.0.0-2`, which
/// orders newer than `1.0.0-1`).
///
/// A `Pkgrel` wraps a `String` guaranteed not to start with `"0"`, to contain only numeric
/// characters, optionally delimited by a single `"."` followed by at least one non-`"0"`
/// numeric character.
///
/// ## Examples
/// ```
/// use pkg_types::Pkgrel;
///
/// assert!(Pkgrel::new("1".to_string()).is_ok());
/// assert!(Pkgrel::new("1.1".to_string()).is_ok());
/// assert!(Pkgrel::new("0".to_string()).is_err());
/// assert!(Pkgrel::new("0.1".to_string()).is_err());
/// assert!(Pkgrel::new("1.0".to_string()).is_err());
/// ```
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Pkgrel(String);

impl Pkgrel {
    /// Creates a new [`Pkgrel`] from a string.
    pub fn new(pkgrel: String) -> Result<Self, Error> {
        if regex_once!(r"^[1-9]+[0-9]*(|[.]{1}[1-9]+[0-9]*)$").is_match(pkgrel.as_str()) {
            Ok(Pkgrel(pkgrel))
        } else {
            Err(Error::InvalidVersion(pkgrel))
        }
    }

    /// Returns a reference to the inner string.
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pkgrel {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Pkgrel::new(input.to_string())
    }
}

impl Display for Pkgrel {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

/// The upstream version of a package.
///
/// A `Pkgver` wraps a `String` guaranteed to only contain alphanumeric characters, `"_"`, `"+"`
/// or `"."`, not starting with `"_"`, `"+"` or `"."`, and at least one char long.
///
/// ## Examples
/// ```
/// use pkg_types::Pkgver;
///
/// assert!(Pkgver::new("1".to_string()).is_ok());
/// assert!(Pkgver::new("1.1".to_string()).is_ok());
/// assert!(Pkgver::new("foo".to_string()).is_ok());
/// assert!(Pkgver::new("0".to_string()).is_ok());
/// assert!(Pkgver::new(".0.1".to_string()).is_err());
/// assert!(Pkgver::new("_1.0".to_string()).is_err());
/// assert!(Pkgver::new("+1.0".to_string()).is_err());
/// ```
#[derive(Clone, Debug, Eq)]
pub struct Pkgver(String);

impl Pkgver {
    /// Creates a new [`Pkgver`] from a string.
    pub fn new(pkgver: String) -> Result<Self, Error> {
        if regex_once!(r"^([^_+.][[:alnum:]_+.]*)$").is_match(pkgver.as_str()) {
            Ok(Pkgver(pkgver))
        } else {
            Err(Error::InvalidVersion(pkgver))
        }
    }

    /// Returns a reference to the inner string.
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pkgver {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Pkgver::new(input.to_string())
    }
}

impl Display for Pkgver {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

impl Ord for Pkgver {
    fn cmp(&self, other: &Self) -> Ordering {
        let self_inner = self.inner();
        let other_inner = other.inner();

        if self_inner == other_inner {
            return Ordering::Equal;
        }

        let mut self_leftover;
        let mut other_leftover;
        let mut self_left_index = 0;
        let mut other_left_index = 0;
        let mut self_right_index = 0;
        let mut other_right_index = 0;

        while self_left_index < self_inner.len() && other_left_index < other_inner.len() {
            while self_left_index < self_inner.len()
                && !self_inner
                    .chars()
                    .nth(self_left_index)
                    .unwrap()
                    .is_alphanumeric()
            {
                self_left_index += 1;
            }
            while other_left_index < other_inner.len()
                && !other
                    .inner()
                    .chars()
                    .nth(other_left_index)
                    .unwrap()
                    .is_alphanumeric()
            {
                other_left_index += 1;
            }

            if self_left_index >= self_inner.len() || other_left_index >= other_inner.len() {
                break;
            }

            if (self_left_index - self_right_index) != (other_left_index - other_right_index) {
                return if (self_left_index - self_right_index)
                    < (other_left_index - other_right_index)
                {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }

            self_right_index = self_left_index;
            other_right_index = other_left_index;
            self_leftover = if let Some(leftover) = self_inner.get(self_left_index..) {
                leftover.to_string()
            } else {
                "".to_string()
            };
            other_leftover = if let Some(leftover) = other_inner.get(other_left_index..) {
                leftover.to_string()
            } else {
                "".to_string()
            };

            let isnum = if !self_leftover.is_empty()
                && self_leftover.chars().next().unwrap().is_numeric()
            {
                self_right_index += self_leftover.chars().take_while(|x| x.is_numeric()).count();
                other_right_index += other_leftover
                    .chars()
                    .take_while(|x| x.is_numeric())
                    .count();
                true
            } else {
                self_right_index += self_leftover
                    .chars()
                    .take_while(|x| x.is_alphabetic())
                    .count();
                other_right_index += other_leftover
                    .chars()
                    .take_while(|x| x.is_alphabetic())
                    .count();
                false
            };

            self_leftover =
                if let Some(leftover) = self_inner.get(self_left_index..self_right_index) {
                    leftover.to_string()
                } else {
                    "".to_string()
                };
            other_leftover =
                if let Some(leftover) = other_inner.get(other_left_index..other_right_index) {
                    leftover.to_string()
                } else {
                    "".to_string()
                };

            if other_leftover.is_empty() {
                return if isnum {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }

            if isnum {
                self_leftover = self_leftover.trim_start_matches('0').to_string();
                other_leftover = other_leftover.trim_start_matches('0').to_string();

                match (self_leftover.len(), other_leftover.len()) {
                    (one_len, two_len) if one_len > two_len => return Ordering::Greater,
                    (one_len, two_len) if one_len < two_len => return Ordering::Less,
                    (_, _) => {}
                }
            }

            if self_leftover.cmp(&other_leftover).is_ne() {
                return self_leftover.cmp(&other_leftover);
            }

            self_left_index = self_right_index;
            other_left_index = other_right_index;
        }

        self_leftover = if let Some(leftover) = self_inner.get(self_left_index..) {
            leftover.to_string()
        } else {
            "".to_string()
        };
        other_leftover = if let Some(leftover) = other_inner.get(other_left_index..) {
            leftover.to_string()
        } else {
            "".to_string()
        };

        if self_leftover.is_empty() && other_leftover.is_empty() {
            return Ordering::Equal;
        }

        if (self_leftover.is_empty() && !other_leftover.chars().next().unwrap().is_alphabetic())
            || (!self_leftover.is_empty() && self_leftover.chars().next().unwrap().is_alphabetic())
        {
            return Ordering::Less;
        }

        Ordering::Greater
    }
}

impl PartialOrd for Pkgver {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pkgver {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

/// The schema version of a structured document (manifest, repository metadata, ...).
///
/// A `SchemaVersion` wraps a `semver::Version`. For backwards compatibility it may also be
/// initialized from a bare integer (e.g. `"2"` -> `"2.0.0"`), as used by the `version` field of
/// repository metadata.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
/// use pkg_types::SchemaVersion;
///
/// let version_one = SchemaVersion::from_str("1.0.0").unwrap();
/// let version_also_one = SchemaVersion::new("1").unwrap();
/// assert_eq!(version_one, version_also_one);
///
/// assert_eq!("1.0.0", format!("{}", version_one));
/// ```
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct SchemaVersion(SemverVersion);

impl SchemaVersion {
    /// Creates a new [`SchemaVersion`] from a string.
    pub fn new(version: &str) -> Result<SchemaVersion, Error> {
        if !version.contains('.') {
            match version.parse() {
                Ok(major) => Ok(SchemaVersion(SemverVersion::new(major, 0, 0))),
                Err(_) => Err(Error::InvalidVersion(version.to_string())),
            }
        } else {
            match SemverVersion::parse(version) {
                Ok(version) => Ok(SchemaVersion(version)),
                Err(_) => Err(Error::InvalidVersion(version.to_string())),
            }
        }
    }

    /// Returns a reference to the inner type.
    pub fn inner(&self) -> &SemverVersion {
        &self.0
    }
}

impl FromStr for SchemaVersion {
    type Err = Error;
    fn from_str(input: &str) -> Result<SchemaVersion, Self::Err> {
        SchemaVersion::new(input)
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

/// A package version: an optional [`Epoch`], a [`Pkgver`], and an optional [`Pkgrel`].
///
/// ## Examples
/// ```
/// use std::str::FromStr;
/// use pkg_types::{Epoch, Pkgrel, Pkgver, Version};
///
/// let version = Version::new("1:1-1").unwrap();
/// assert_eq!(version.epoch(), Some(&Epoch::new("1".to_string()).unwrap()));
/// assert_eq!(version.pkgver(), &Pkgver::new("1".to_string()).unwrap());
/// assert_eq!(version.pkgrel(), Some(&Pkgrel::new("1".to_string()).unwrap()));
/// ```
#[derive(Debug, Clone, Eq)]
pub struct Version {
    pkgver: Pkgver,
    epoch: Option<Epoch>,
    pkgrel: Option<Pkgrel>,
}

impl Version {
    /// Creates a new [`Version`] from a string.
    pub fn new(version: &str) -> Result<Self, Error> {
        let mut epoch_split = vec![];
        let mut pkgrel_split = vec![];
        for (i, char) in version.chars().enumerate() {
            match char {
                ':' => epoch_split.push(i),
                '-' => pkgrel_split.push(i),
                _ => {}
            }
        }

        Ok(Version {
            pkgver: match (epoch_split.len(), pkgrel_split.len()) {
                (1, 1) if epoch_split[0] > pkgrel_split[0] => {
                    return Err(Error::InvalidVersion(version.to_string()));
                }
                (1, 1) => Pkgver::new(version[epoch_split[0] + 1..pkgrel_split[0]].to_string())?,
                (0, 1) => Pkgver::new(version[..pkgrel_split[0]].to_string())?,
                (0, 0) => Pkgver::new(version.to_string())?,
                (1, 0) => Pkgver::new(version[epoch_split[0] + 1..].to_string())?,
                (_, _) => return Err(Error::InvalidVersion(version.to_string())),
            },
            epoch: if epoch_split.len() == 1 {
                Some(Epoch::new(version[..epoch_split[0]].to_string())?)
            } else {
                None
            },
            pkgrel: if pkgrel_split.len() == 1 {
                Some(Pkgrel::new(version[pkgrel_split[0] + 1..].to_string())?)
            } else {
                None
            },
        })
    }

    /// Creates a new [`Version`], requiring it to carry a [`Pkgrel`].
    pub fn with_pkgrel(version: &str) -> Result<Self, Error> {
        match Version::new(version) {
            Ok(version) if version.pkgrel().is_some() => Ok(version),
            _ => Err(Error::InvalidVersion(version.to_string())),
        }
    }

    /// Returns the epoch, if any.
    pub fn epoch(&self) -> Option<&Epoch> {
        self.epoch.as_ref()
    }

    /// Returns the upstream version.
    pub fn pkgver(&self) -> &Pkgver {
        &self.pkgver
    }

    /// Returns the release number, if any.
    pub fn pkgrel(&self) -> Option<&Pkgrel> {
        self.pkgrel.as_ref()
    }

    /// Compares two versions, returning `1` if `a` is newer, `0` if equal and `-1` if older.
    ///
    /// ## Examples
    /// ```
    /// use pkg_types::Version;
    ///
    /// assert_eq!(Version::vercmp(&Version::new("1.0.0").unwrap(), &Version::new("0.1.0").unwrap()), 1);
    /// assert_eq!(Version::vercmp(&Version::new("1.0.0").unwrap(), &Version::new("1.0.0").unwrap()), 0);
    /// assert_eq!(Version::vercmp(&Version::new("0.1.0").unwrap(), &Version::new("1.0.0").unwrap()), -1);
    /// ```
    pub fn vercmp(a: &Version, b: &Version) -> i8 {
        match a.cmp(b) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
}

impl FromStr for Version {
    type Err = Error;
    fn from_str(input: &str) -> Result<Version, Self::Err> {
        Version::new(input)
    }
}

impl Display for Version {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        if let Some(epoch) = self.epoch() {
            write!(fmt, "{}:", epoch)?;
        }

        write!(fmt, "{}", self.pkgver())?;

        if let Some(pkgrel) = self.pkgrel() {
            write!(fmt, "-{}", pkgrel)?;
        }

        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.epoch, other.epoch) {
            (Some(self_epoch), Some(other_epoch)) if self_epoch.cmp(&other_epoch).is_ne() => {
                return self_epoch.cmp(&other_epoch);
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (_, _) => {}
        }

        let pkgver_cmp = self.pkgver.cmp(&other.pkgver);
        if pkgver_cmp.is_ne() {
            return pkgver_cmp;
        }

        self.pkgrel.cmp(&other.pkgrel)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.epoch == other.epoch
            && self.pkgver.cmp(&other.pkgver).is_eq()
            && self.pkgrel == other.pkgrel
    }
}

/// The comparison function for a [`VersionRequirement`].
///
/// Variant order matters: [`strum::IntoEnumIterator`] yields two-letter comparators
/// (`<=`, `>=`) before their one-letter prefixes, which [`Dependency::from_str`] relies on
/// when splitting a relation string on the first matching comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter, strum::AsRefStr)]
pub enum VersionComparison {
    /// Less than or equal to.
    #[strum(serialize = "<=")]
    LessOrEqual,
    /// Greater than or equal to.
    #[strum(serialize = ">=")]
    GreaterOrEqual,
    /// Strictly less than.
    #[strum(serialize = "<")]
    Less,
    /// Strictly greater than.
    #[strum(serialize = ">")]
    Greater,
    /// Equal to.
    #[strum(serialize = "=")]
    Equal,
}

impl VersionComparison {
    /// Returns `true` if `ord` (the result of comparing an actual version against the required
    /// one) satisfies this comparison function.
    fn is_compatible_with(self, ord: Ordering) -> bool {
        match (self, ord) {
            (VersionComparison::Less, Ordering::Less)
            | (VersionComparison::LessOrEqual, Ordering::Less | Ordering::Equal)
            | (VersionComparison::Equal, Ordering::Equal)
            | (VersionComparison::GreaterOrEqual, Ordering::Greater | Ordering::Equal)
            | (VersionComparison::Greater, Ordering::Greater) => true,

            (VersionComparison::Less, Ordering::Equal | Ordering::Greater)
            | (VersionComparison::LessOrEqual, Ordering::Greater)
            | (VersionComparison::Equal, Ordering::Less | Ordering::Greater)
            | (VersionComparison::GreaterOrEqual, Ordering::Less)
            | (VersionComparison::Greater, Ordering::Less | Ordering::Equal) => false,
        }
    }
}

impl FromStr for VersionComparison {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(VersionComparison::Less),
            "<=" => Ok(VersionComparison::LessOrEqual),
            "=" => Ok(VersionComparison::Equal),
            ">=" => Ok(VersionComparison::GreaterOrEqual),
            ">" => Ok(VersionComparison::Greater),
            _ => Err(Error::InvalidVersionComparison(s.to_owned())),
        }
    }
}

/// A version requirement, e.g. for a dependency relation.
///
/// Consists of a target version and a comparison function. A version requirement of `>=1.5` has
/// a target version of `1.5` and a comparison function of [`VersionComparison::GreaterOrEqual`].
///
/// ## Examples
///
/// ```
/// use pkg_types::{Version, VersionComparison, VersionRequirement};
///
/// let requirement = VersionRequirement::new(">=1.5").unwrap();
///
/// assert_eq!(requirement.comparison, VersionComparison::GreaterOrEqual);
/// assert_eq!(requirement.version, Version::new("1.5").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement {
    /// The comparison function.
    pub comparison: VersionComparison,
    /// The version to compare against.
    pub version: Version,
}

impl VersionRequirement {
    /// Parses a version requirement from a string.
    ///
    /// ## Errors
    ///
    /// Returns an error if the comparison function or version are malformed.
    pub fn new(s: &str) -> Result<Self, Error> {
        fn is_comparison_char(c: char) -> bool {
            matches!(c, '<' | '=' | '>')
        }

        let comparison_end = s
            .find(|c| !is_comparison_char(c))
            .ok_or_else(|| Error::InvalidVersionRequirement(s.to_owned()))?;

        let (comparison, version) = s.split_at(comparison_end);

        let comparison = comparison.parse()?;
        let version = version.parse()?;

        Ok(VersionRequirement {
            comparison,
            version,
        })
    }

    /// Returns `true` if the requirement is satisfied by the given package version.
    ///
    /// ## Examples
    ///
    /// ```
    /// use pkg_types::{Version, VersionRequirement};
    ///
    /// let requirement = VersionRequirement::new(">=1.5-3").unwrap();
    ///
    /// assert!(!requirement.is_satisfied_by(&Version::new("1.5").unwrap()));
    /// assert!(requirement.is_satisfied_by(&Version::new("1.5-3").unwrap()));
    /// assert!(requirement.is_satisfied_by(&Version::new("1.6").unwrap()));
    /// assert!(requirement.is_satisfied_by(&Version::new("2:1.0").unwrap()));
    /// assert!(!requirement.is_satisfied_by(&Version::new("1.0").unwrap()));
    /// ```
    pub fn is_satisfied_by(&self, ver: &Version) -> bool {
        self.comparison.is_compatible_with(ver.cmp(&self.version))
    }
}

impl FromStr for VersionRequirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
