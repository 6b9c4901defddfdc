//! Package name handling.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use crate::Error;
use crate::macros::regex_once;

/// A package name.
///
/// Names may contain the characters `[a-z\d\-._@+]`, but must not start with `[-.]`.
///
/// ## Examples
/// ```
/// use pkg_types::{Name, Error};
/// use std::str::FromStr;
///
/// assert_eq!(
///     Name::from_str("zstd-utils"),
///     Ok(Name::new("zstd-utils".to_string()).unwrap())
/// );
/// assert!(Name::from_str(".zstd-utils").is_err());
/// assert_eq!("foo", format!("{}", Name::new("foo".to_string()).unwrap()));
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`], validating the naming restrictions.
    pub fn new(name: String) -> Result<Self, Error> {
        if regex_once!(r"^[a-z\d_@+]+[a-z\d\-._@+]*$").is_match(name.as_str()) {
            Ok(Name(name))
        } else {
            Err(Error::InvalidName(name))
        }
    }

    /// Returns a reference to the inner string.
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl FromStr for Name {
    type Err = Error;
    fn from_str(input: &str) -> Result<Name, Self::Err> {
        Name::new(input.to_string())
    }
}

impl Display for Name {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.inner()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn valid_name_from_string(name_str in r"[a-z\d_@+]+[a-z\d\-._@+]*") {
            let name = Name::from_str(&name_str).unwrap();
            prop_assert_eq!(name_str, format!("{}", name));
        }

        #[test]
        fn invalid_name_from_string_start(name_str in r"[\-.]+[a-z\d\-._@+]*") {
            let error = Name::from_str(&name_str).unwrap_err();
            assert!(format!("{}", error).ends_with(&name_str));
        }
    }
}
