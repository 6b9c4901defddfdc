//! Timestamp handling.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::Error;

/// A point in time, expressed in seconds since the Unix epoch.
///
/// Used for manifest build timestamps and metalog entry mtimes.
///
/// ## Examples
/// ```
/// use pkg_types::{Timestamp, Error};
/// use chrono::{DateTime, Utc};
/// use std::str::FromStr;
///
/// let datetime: Timestamp = DateTime::<Utc>::from_timestamp(1, 0).unwrap().into();
/// assert_eq!(Timestamp::new(1), datetime);
///
/// assert_eq!(Timestamp::from_str("1"), Ok(Timestamp::new(1)));
/// assert_eq!(
///     Timestamp::from_str("foo"),
///     Err(Error::InvalidTimestamp(String::from("foo")))
/// );
///
/// assert_eq!("1", format!("{}", Timestamp::new(1)));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a new [`Timestamp`].
    pub fn new(seconds: i64) -> Timestamp {
        Timestamp(seconds)
    }

    /// Returns a reference to the inner type.
    pub fn inner(&self) -> &i64 {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(input: DateTime<Utc>) -> Timestamp {
        Timestamp(input.timestamp())
    }
}

impl FromStr for Timestamp {
    type Err = Error;
    fn from_str(input: &str) -> Result<Timestamp, Self::Err> {
        match input.parse::<i64>() {
            Ok(seconds) => Ok(Timestamp(seconds)),
            _ => Err(Error::InvalidTimestamp(input.to_string())),
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", Ok(Timestamp(1)))]
    #[case("foo", Err(Error::InvalidTimestamp(String::from("foo"))))]
    fn timestamp_from_string(#[case] from_str: &str, #[case] result: Result<Timestamp, Error>) {
        assert_eq!(Timestamp::from_str(from_str), result);
    }

    #[rstest]
    fn timestamp_format_string() {
        assert_eq!("1", format!("{}", Timestamp::new(1)));
    }

    #[rstest]
    fn datetime_into_timestamp() {
        let timestamp = Timestamp(1);
        let datetime: Timestamp = DateTime::<Utc>::from_timestamp(1, 0).unwrap().into();
        assert_eq!(timestamp, datetime);
    }
}
