//! Package and flat (installed) size handling.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use crate::Error;

/// The size of a package archive, in bytes.
///
/// ## Examples
/// ```
/// use pkg_types::{PkgSize, Error};
/// use std::str::FromStr;
///
/// assert_eq!(PkgSize::from_str("1"), Ok(PkgSize::new(1)));
/// assert_eq!(
///     PkgSize::from_str("-1"),
///     Err(Error::InvalidPkgSize(String::from("-1")))
/// );
///
/// assert_eq!("1", format!("{}", PkgSize::new(1)));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PkgSize(u64);

impl PkgSize {
    /// Creates a new [`PkgSize`].
    pub fn new(size: u64) -> PkgSize {
        PkgSize(size)
    }

    /// Returns a reference to the inner type.
    pub fn inner(&self) -> &u64 {
        &self.0
    }
}

impl FromStr for PkgSize {
    type Err = Error;
    fn from_str(input: &str) -> Result<PkgSize, Self::Err> {
        match input.parse::<u64>() {
            Ok(size) => Ok(PkgSize(size)),
            _ => Err(Error::InvalidPkgSize(input.to_string())),
        }
    }
}

impl Display for PkgSize {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

/// The flat (i.e. installed, uncompressed) size of a package, in bytes.
///
/// ## Examples
/// ```
/// use pkg_types::{FlatSize, Error};
/// use std::str::FromStr;
///
/// assert_eq!(FlatSize::from_str("1"), Ok(FlatSize::new(1)));
/// assert_eq!(
///     FlatSize::from_str("-1"),
///     Err(Error::InvalidFlatSize(String::from("-1")))
/// );
///
/// assert_eq!("1", format!("{}", FlatSize::new(1)));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FlatSize(u64);

impl FlatSize {
    /// Creates a new [`FlatSize`].
    pub fn new(size: u64) -> FlatSize {
        FlatSize(size)
    }

    /// Returns a reference to the inner type.
    pub fn inner(&self) -> &u64 {
        &self.0
    }
}

impl FromStr for FlatSize {
    type Err = Error;
    fn from_str(input: &str) -> Result<FlatSize, Self::Err> {
        match input.parse::<u64>() {
            Ok(size) => Ok(FlatSize(size)),
            _ => Err(Error::InvalidFlatSize(input.to_string())),
        }
    }
}

impl Display for FlatSize {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", Ok(PkgSize::new(1)))]
    #[case("-1", Err(Error::InvalidPkgSize(String::from("-1"))))]
    fn pkgsize_from_string(#[case] from_str: &str, #[case] result: Result<PkgSize, Error>) {
        assert_eq!(PkgSize::from_str(from_str), result);
    }

    #[rstest]
    fn pkgsize_format_string() {
        assert_eq!("1", format!("{}", PkgSize::new(1)));
    }

    #[rstest]
    #[case("1", Ok(FlatSize::new(1)))]
    #[case("-1", Err(Error::InvalidFlatSize(String::from("-1"))))]
    fn flatsize_from_string(#[case] from_str: &str, #[case] result: Result<FlatSize, Error>) {
        assert_eq!(FlatSize::from_str(from_str), result);
    }

    #[rstest]
    fn flatsize_format_string() {
        assert_eq!("1", format!("{}", FlatSize::new(1)));
    }
}
