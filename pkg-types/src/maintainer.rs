//! Maintainer identity handling.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use email_address::EmailAddress;

use crate::Error;
use crate::macros::regex_once;

/// The maintainer of a package.
///
/// A `Maintainer` is represented by a User ID (e.g. `"Foobar McFooFace <foobar@mcfooface.org>"`).
/// Internally this struct wraps a `String` for the name and an `EmailAddress` for a valid email
/// address. Used both for the manifest `maintainer` field and for signer fingerprint metadata.
///
/// ## Examples
/// ```
/// use pkg_types::{Maintainer, Error};
/// use std::str::FromStr;
///
/// let maintainer = Maintainer::new("Foobar McFooface <foobar@mcfooface.org>").unwrap();
///
/// assert_eq!("Foobar McFooface", maintainer.name());
/// assert_eq!("foobar@mcfooface.org", maintainer.email().to_string());
/// assert_eq!("mcfooface.org", maintainer.email().domain());
/// assert_eq!("Foobar McFooface <foobar@mcfooface.org>", format!("{}", maintainer));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Maintainer {
    name: String,
    email: EmailAddress,
}

impl Maintainer {
    /// Creates a new [`Maintainer`] from a string.
    pub fn new(maintainer: &str) -> Result<Maintainer, Error> {
        let maintainer_regex = regex_once!(r"^(?P<name>[\w\s\-().]+) <(?P<email>.*)>$");
        let captures = maintainer_regex
            .captures(maintainer)
            .ok_or_else(|| Error::InvalidMaintainer(maintainer.to_string()))?;
        let name = captures
            .name("name")
            .ok_or_else(|| Error::InvalidMaintainer(maintainer.to_string()))?
            .as_str();
        let email_str = captures
            .name("email")
            .ok_or_else(|| Error::InvalidMaintainer(maintainer.to_string()))?
            .as_str();
        let email = EmailAddress::from_str(email_str)
            .map_err(|_| Error::InvalidMaintainer(maintainer.to_string()))?;
        Ok(Maintainer {
            name: name.to_string(),
            email,
        })
    }

    /// Returns the name of the maintainer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email of the maintainer.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

impl FromStr for Maintainer {
    type Err = Error;
    fn from_str(input: &str) -> Result<Maintainer, Self::Err> {
        Maintainer::new(input)
    }
}

impl Display for Maintainer {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{} <{}>", self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(
        "Foobar McFooface (The Third) <foobar@mcfooface.org>",
        Ok(Maintainer{
            name: "Foobar McFooface (The Third)".to_string(),
            email: EmailAddress::from_str("foobar@mcfooface.org").unwrap()
        })
    )]
    #[case(
        "Foobar McFooface <foobar@mcfooface.org>",
        Ok(Maintainer{
            name: "Foobar McFooface".to_string(),
            email: EmailAddress::from_str("foobar@mcfooface.org").unwrap()
        })
    )]
    #[case(
        "Foobar McFooface <@mcfooface.org>",
        Err(Error::InvalidMaintainer("Foobar McFooface <@mcfooface.org>".to_string())),
    )]
    #[case(
        "<foobar@mcfooface.org>",
        Err(Error::InvalidMaintainer("<foobar@mcfooface.org>".to_string())),
    )]
    #[case(
        "[foo] <foobar@mcfooface.org>",
        Err(Error::InvalidMaintainer("[foo] <foobar@mcfooface.org>".to_string())),
    )]
    #[case(
        "foobar@mcfooface.org",
        Err(Error::InvalidMaintainer("foobar@mcfooface.org".to_string())),
    )]
    fn maintainer(#[case] from_str: &str, #[case] result: Result<Maintainer, Error>) {
        assert_eq!(Maintainer::from_str(from_str), result);
    }

    #[rstest]
    #[case(
        Maintainer::new("Foobar McFooface <foobar@mcfooface.org>").unwrap(),
        "Foobar McFooface <foobar@mcfooface.org>"
    )]
    fn maintainer_format_string(#[case] maintainer: Maintainer, #[case] maintainer_str: &str) {
        assert_eq!(maintainer_str, format!("{}", maintainer));
    }

    #[rstest]
    #[case(Maintainer::new("Foobar McFooface <foobar@mcfooface.org>").unwrap(), "Foobar McFooface")]
    fn maintainer_name(#[case] maintainer: Maintainer, #[case] name: &str) {
        assert_eq!(name, maintainer.name());
    }
}
