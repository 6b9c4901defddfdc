//! License expression handling.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Serialize;
use serde::Serializer;
use spdx::Expression;

use crate::Error;

/// A license expression that is either a valid SPDX identifier or a non-standard one.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use pkg_types::License;
///
/// # fn main() -> Result<(), pkg_types::Error> {
/// let license = License::from_str("MIT")?;
/// assert!(license.is_spdx());
/// assert_eq!(license.to_string(), "MIT");
///
/// let license = License::from_str("My-Custom-License")?;
/// assert!(!license.is_spdx());
/// assert_eq!(license.to_string(), "My-Custom-License");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum License {
    /// A valid SPDX license expression.
    ///
    /// Boxed to avoid a large enum variant.
    Spdx(Box<spdx::Expression>),
    /// A non-standard license identifier.
    Unknown(String),
}

impl Serialize for License {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl License {
    /// Creates a new license, accepting both SPDX and non-standard identifiers.
    pub fn new(license: String) -> Result<Self, Error> {
        Self::from_valid_spdx(license.clone()).or(Ok(Self::Unknown(license)))
    }

    /// Creates a new license from a valid, non-deprecated SPDX identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the given input cannot be parsed or is a deprecated license.
    pub fn from_valid_spdx(identifier: String) -> Result<Self, Error> {
        let expression =
            Expression::parse(&identifier).map_err(|err| Error::InvalidLicense {
                value: identifier.clone(),
                reason: err.to_string(),
            })?;
        if spdx::license_id(&identifier)
            .map(|v| v.is_deprecated())
            .unwrap_or(false)
        {
            return Err(Error::InvalidLicense {
                value: identifier,
                reason: "deprecated SPDX license".to_string(),
            });
        }

        Ok(Self::Spdx(Box::new(expression)))
    }

    /// Returns `true` if the license is a valid SPDX identifier.
    pub fn is_spdx(&self) -> bool {
        matches!(self, License::Spdx(_))
    }
}

impl FromStr for License {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl Display for License {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self {
            License::Spdx(expr) => write!(f, "{expr}"),
            License::Unknown(s) => write!(f, "{s}"),
        }
    }
}

/// The logical operator joining multiple [`License`] expressions attached to a single package.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
/// use pkg_types::LicenseLogic;
///
/// assert_eq!(LicenseLogic::from_str("and"), Ok(LicenseLogic::And));
/// assert_eq!(LicenseLogic::from_str("or"), Ok(LicenseLogic::Or));
/// assert_eq!("and", format!("{}", LicenseLogic::And));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LicenseLogic {
    /// A single license applies; `licenses` carries exactly one entry.
    #[default]
    Single,
    /// All listed licenses apply.
    And,
    /// Any one of the listed licenses applies.
    Or,
}

impl FromStr for LicenseLogic {
    type Err = Error;
    fn from_str(input: &str) -> Result<LicenseLogic, Self::Err> {
        match input {
            "single" => Ok(LicenseLogic::Single),
            "and" | "multi" => Ok(LicenseLogic::And),
            "or" | "dual" => Ok(LicenseLogic::Or),
            _ => Err(Error::InvalidLicenseLogic(input.to_string())),
        }
    }
}

impl Display for LicenseLogic {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        match self {
            LicenseLogic::Single => write!(fmt, "single"),
            LicenseLogic::And => write!(fmt, "and"),
            LicenseLogic::Or => write!(fmt, "or"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("MIT", License::Spdx(Box::new(Expression::parse("MIT").unwrap())))]
    #[case("Apache-2.0", License::Spdx(Box::new(Expression::parse("Apache-2.0").unwrap())))]
    #[case("Apache-2.0+", License::Spdx(Box::new(Expression::parse("Apache-2.0+").unwrap())))]
    #[case(
        "Apache-2.0 WITH LLVM-exception",
        License::Spdx(Box::new(Expression::parse("Apache-2.0 WITH LLVM-exception").unwrap()))
    )]
    #[case("GPL-3.0-or-later", License::Spdx(Box::new(Expression::parse("GPL-3.0-or-later").unwrap())))]
    #[case(
        "NonStandard-License",
        License::Unknown(String::from("NonStandard-License"))
    )]
    fn test_parse_license(
        #[case] input: &str,
        #[case] expected: License,
    ) -> testresult::TestResult<()> {
        let license = input.parse::<License>()?;
        assert_eq!(license, expected);
        assert_eq!(license.to_string(), input.to_string());
        Ok(())
    }

    #[rstest]
    #[case("GPL-2.0")]
    #[case("BSD-2-Clause-FreeBSD")]
    fn test_deprecated_spdx(#[case] input: &str) {
        let result = License::from_valid_spdx(input.to_string());
        assert!(matches!(result, Err(Error::InvalidLicense { .. })));
    }

    #[rstest]
    #[case("MIT", true)]
    #[case("Custom-License", false)]
    fn test_license_kind(#[case] input: &str, #[case] is_spdx: bool) -> testresult::TestResult<()> {
        let license = License::from_str(input)?;
        assert_eq!(license.is_spdx(), is_spdx);
        Ok(())
    }

    #[rstest]
    #[case("and", Ok(LicenseLogic::And))]
    #[case("or", Ok(LicenseLogic::Or))]
    #[case("xor", Err(Error::InvalidLicenseLogic("xor".to_string())))]
    fn test_license_logic(#[case] input: &str, #[case] expected: Result<LicenseLogic, Error>) {
        assert_eq!(LicenseLogic::from_str(input), expected);
    }
}
