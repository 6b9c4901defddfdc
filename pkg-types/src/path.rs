//! Path handling.

use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use crate::Error;

/// A representation of an absolute path.
///
/// `AbsolutePath` wraps a `PathBuf` that is guaranteed to be absolute.
///
/// ## Examples
/// ```
/// use pkg_types::{AbsolutePath, Error};
/// use std::str::FromStr;
///
/// assert_eq!(
///     AbsolutePath::from_str("/"),
///     Ok(AbsolutePath::new("/").unwrap())
/// );
/// assert_eq!(
///     AbsolutePath::from_str("./"),
///     Err(Error::InvalidAbsolutePath(String::from("./")))
/// );
///
/// assert_eq!("/", format!("{}", AbsolutePath::new("/").unwrap()));
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AbsolutePath(PathBuf);

impl AbsolutePath {
    /// Creates a new [`AbsolutePath`].
    pub fn new(input: &str) -> Result<AbsolutePath, Error> {
        match Path::new(input).is_absolute() {
            true => Ok(AbsolutePath(PathBuf::from(input))),
            false => Err(Error::InvalidAbsolutePath(input.to_string())),
        }
    }

    /// Returns a reference to the inner type.
    pub fn inner(&self) -> &Path {
        &self.0
    }

    /// Joins `relative` onto this path, rejecting any component that would
    /// escape it (`..` segments, or an absolute `relative`).
    ///
    /// Used when resolving packing-list entries and installer targets against
    /// a package's installation prefix: nothing in a package archive is
    /// allowed to write outside of the directory it is rooted at.
    pub fn join_checked(&self, relative: &Path) -> Result<PathBuf, Error> {
        if relative.is_absolute() {
            return Err(Error::PathEscapesRoot(relative.to_path_buf()));
        }
        let mut depth: i64 = 0;
        for component in relative.components() {
            match component {
                Component::Normal(_) => depth += 1,
                Component::CurDir => {}
                Component::ParentDir => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(Error::PathEscapesRoot(relative.to_path_buf()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::PathEscapesRoot(relative.to_path_buf()));
                }
            }
        }
        Ok(self.0.join(relative))
    }
}

impl FromStr for AbsolutePath {
    type Err = Error;
    fn from_str(input: &str) -> Result<AbsolutePath, Self::Err> {
        AbsolutePath::new(input)
    }
}

impl Display for AbsolutePath {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner().display())
    }
}

impl AsRef<Path> for AbsolutePath {
    fn as_ref(&self) -> &Path {
        self.inner()
    }
}
