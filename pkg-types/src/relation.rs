//! Package relation handling: dependencies, provided names and conflicts.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::Error;
use crate::Name;
use crate::VersionComparison;
use crate::VersionRequirement;

/// A relation to another package, used for `deps`, `provides`, `requires` and `conflicts`.
///
/// A [`Dependency`] consists of a [`Name`] and an optional [`VersionRequirement`].
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
///
/// use pkg_types::{Dependency, VersionComparison, VersionRequirement};
///
/// # fn main() -> Result<(), pkg_types::Error> {
/// Dependency::new(
///     "example".parse()?,
///     Some(VersionRequirement {
///         comparison: VersionComparison::Less,
///         version: "1.0.0".parse()?,
///     }),
/// );
///
/// Dependency::new("example".parse()?, None);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Dependency {
    /// The name of the related package.
    pub name: Name,
    /// The version requirement placed on the related package, if any.
    pub version_requirement: Option<VersionRequirement>,
}

impl Dependency {
    /// Creates a new [`Dependency`].
    pub fn new(name: Name, version_requirement: Option<VersionRequirement>) -> Self {
        Self {
            name,
            version_requirement,
        }
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(version_requirement) = self.version_requirement.as_ref() {
            write!(f, "{}{}", self.name, version_requirement)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl FromStr for Dependency {
    type Err = Error;

    /// Parses a [`Dependency`] from a string slice.
    ///
    /// ## Examples
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use pkg_types::{Dependency, VersionComparison, VersionRequirement};
    ///
    /// # fn main() -> Result<(), pkg_types::Error> {
    /// assert_eq!(
    ///     Dependency::from_str("example<1.0.0")?,
    ///     Dependency::new(
    ///         "example".parse()?,
    ///         Some(VersionRequirement {
    ///             comparison: VersionComparison::Less,
    ///             version: "1.0.0".parse()?
    ///         })
    ///     ),
    /// );
    ///
    /// assert_eq!(
    ///     Dependency::from_str("example")?,
    ///     Dependency::new("example".parse()?, None),
    /// );
    ///
    /// assert!(Dependency::from_str("example<").is_err());
    /// # Ok(())
    /// # }
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Relies on VersionComparison's iteration order putting two-letter comparators
        // (`<=`, `>=`) ahead of the one-letter comparators they contain as substrings.
        for comparison in VersionComparison::iter() {
            if let Some((name, version)) = s.split_once(comparison.as_ref()) {
                return Ok(Self {
                    name: Name::new(name.to_string())?,
                    version_requirement: Some(VersionRequirement {
                        comparison,
                        version: version.parse()?,
                    }),
                });
            }
        }

        Ok(Self {
            name: Name::new(s.to_string())?,
            version_requirement: None,
        })
    }
}

/// An optional dependency for a package.
///
/// Represents a dependency that is not essential for the base functionality of a package, but
/// that unlocks an optional feature when present. Consists of a [`Dependency`] and an optional
/// description, separated by `:`.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
///
/// use pkg_types::OptionalDependency;
///
/// # fn main() -> Result<(), pkg_types::Error> {
/// let opt_depend = OptionalDependency::from_str("example: this is an example dependency")?;
///
/// assert_eq!("example", opt_depend.name().as_ref());
/// assert_eq!(
///     Some("this is an example dependency"),
///     opt_depend.description().as_deref()
/// );
/// assert_eq!(
///     "example: this is an example dependency",
///     format!("{opt_depend}")
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct OptionalDependency {
    dependency: Dependency,
    description: Option<String>,
}

impl OptionalDependency {
    /// Creates a new [`OptionalDependency`].
    pub fn new(dependency: Dependency, description: Option<String>) -> OptionalDependency {
        OptionalDependency {
            dependency,
            description,
        }
    }

    /// Returns the name of the optional dependency.
    pub fn name(&self) -> &Name {
        &self.dependency.name
    }

    /// Returns the version requirement of the optional dependency, if any.
    pub fn version_requirement(&self) -> &Option<VersionRequirement> {
        &self.dependency.version_requirement
    }

    /// Returns the description for the optional dependency, if any.
    pub fn description(&self) -> &Option<String> {
        &self.description
    }
}

impl FromStr for OptionalDependency {
    type Err = Error;

    fn from_str(s: &str) -> Result<OptionalDependency, Self::Err> {
        if let Some((name, description)) = s.split_once(':') {
            let description = description.trim_start();
            let dependency = Dependency::from_str(name)?;
            Ok(Self::new(
                dependency,
                (!description.is_empty()).then_some(description.to_string()),
            ))
        } else {
            Ok(Self::new(Dependency::new(Name::new(s.to_string())?, None), None))
        }
    }
}

impl Display for OptionalDependency {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        match self.description {
            Some(ref description) => write!(fmt, "{}: {}", self.name(), description),
            None => write!(fmt, "{}", self.name()),
        }
    }
}

/// The name of a package group: an arbitrary collection of packages sharing a common
/// characteristic or purpose.
///
/// This is a type alias for [`String`]; while a group name can be any valid UTF-8 string, it is
/// recommended to follow the format of [`Name`].
pub type Group = String;

#[cfg(test)]
mod tests {
    use proptest::prop_assert_eq;
    use proptest::proptest;
    use proptest::test_runner::Config as ProptestConfig;
    use rstest::rstest;

    use super::*;

    const COMPARATOR_REGEX: &str = r"(<|<=|=|>=|>)";
    const EPOCH_REGEX: &str = r"[1-9]{1}[0-9]{0,10}";
    const NAME_REGEX: &str = r"[a-z0-9_@+]+[a-z0-9\-._@+]*";
    const PKGREL_REGEX: &str = r"[1-9]+[0-9]*(|[.]{1}[1-9]{1}[0-9]*)";
    const PKGVER_REGEX: &str = r"([[:alnum:]][[:alnum:]_+.]*)";
    const DESCRIPTION_REGEX: &str = r"[[:alnum:]][[:alnum:] _+.,-]*";

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn valid_dependency_from_str(s in format!("{NAME_REGEX}(|{COMPARATOR_REGEX}(|{EPOCH_REGEX}:){PKGVER_REGEX}(|-{PKGREL_REGEX}))").as_str()) {
            let dependency = Dependency::from_str(&s).unwrap();
            prop_assert_eq!(s, format!("{}", dependency));
        }
    }

    proptest! {
        #[test]
        fn optional_dependency_from_str(s in format!("{NAME_REGEX}(: {DESCRIPTION_REGEX})?").as_str()) {
            let opt_depend = OptionalDependency::from_str(&s).unwrap();
            let formatted = format!("{}", opt_depend);
            prop_assert_eq!(s.trim_end(), formatted.trim_end(), "Formatted output doesn't match input");
        }
    }

    #[rstest]
    #[case(
        "example: this is an example dependency",
        Ok(OptionalDependency {
            dependency: Dependency {
                name: Name::new("example".to_string()).unwrap(),
                version_requirement: None,
            },
            description: Some("this is an example dependency".to_string()),
        }),
    )]
    #[case(
        "dep_name",
        Ok(OptionalDependency {
            dependency: Dependency {
                name: Name::new("dep_name".to_string()).unwrap(),
                version_requirement: None,
            },
            description: None,
        }),
    )]
    #[case(
        "dep_name: ",
        Ok(OptionalDependency {
            dependency: Dependency {
                name: Name::new("dep_name".to_string()).unwrap(),
                version_requirement: None,
            },
            description: None,
        }),
    )]
    // versioned optional dependencies
    #[case(
        "elfutils=0.192: for translations",
        Ok(OptionalDependency {
            dependency: Dependency {
                name: Name::new("elfutils".to_string()).unwrap(),
                version_requirement: Some(VersionRequirement {
                    comparison: VersionComparison::Equal,
                    version: "0.192".parse().unwrap(),
                }),
            },
            description: Some("for translations".to_string()),
        }),
    )]
    #[case(
        "python>=3: For Python bindings",
        Ok(OptionalDependency {
            dependency: Dependency {
                name: Name::new("python".to_string()).unwrap(),
                version_requirement: Some(VersionRequirement {
                    comparison: VersionComparison::GreaterOrEqual,
                    version: "3".parse().unwrap(),
                }),
            },
            description: Some("For Python bindings".to_string()),
        }),
    )]
    fn optional_dependency_from_string(
        #[case] input: &str,
        #[case] expected_result: Result<OptionalDependency, Error>,
    ) {
        let result = OptionalDependency::from_str(input);
        assert_eq!(expected_result, result);
    }
}
