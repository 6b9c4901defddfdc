//! Shared-library dependency records, as extracted from an ELF/Mach-O binary's dynamic section.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;

/// The name of a shared library, as found in an ELF `DT_NEEDED`/`DT_SONAME` entry or a Mach-O
/// `LC_ID_DYLIB`/`LC_LOAD_DYLIB` load command.
///
/// ## Examples
/// ```
/// use pkg_types::Soname;
/// use std::str::FromStr;
///
/// let soname = Soname::from_str("libc.so.7").unwrap();
/// assert_eq!(soname.to_string(), "libc.so.7");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Soname(String);

impl Soname {
    /// Creates a new [`Soname`].
    pub fn new(name: String) -> Result<Self, Error> {
        if name.is_empty() {
            Err(Error::InvalidSoname(name))
        } else {
            Ok(Soname(name))
        }
    }

    /// Returns a reference to the inner string.
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl FromStr for Soname {
    type Err = Error;
    fn from_str(input: &str) -> Result<Soname, Self::Err> {
        Soname::new(input.to_string())
    }
}

impl Display for Soname {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

impl AsRef<str> for Soname {
    fn as_ref(&self) -> &str {
        self.inner()
    }
}

/// A shared-library dependency discovered by scanning a package's ELF/Mach-O files.
///
/// Carries the flags the binfmt scanner needs in order to decide which system-provided or
/// co-packaged library satisfies the need: whether the requiring binary is itself 32-bit
/// (`compat_32`) and whether it targets the Linux compatibility ABI on a non-Linux host
/// (`compat_linux`).
#[derive(Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct SharedLibraryDependency {
    /// The required library's soname.
    pub soname: Soname,
    /// Whether the requiring binary is a 32-bit ELF object.
    pub compat_32: bool,
    /// Whether the requiring binary targets the Linux compatibility ABI.
    pub compat_linux: bool,
}

impl SharedLibraryDependency {
    /// Creates a new [`SharedLibraryDependency`].
    pub fn new(soname: Soname, compat_32: bool, compat_linux: bool) -> Self {
        Self {
            soname,
            compat_32,
            compat_linux,
        }
    }
}

impl Display for SharedLibraryDependency {
    // Wire order is `name[:Linux][:32]` (compat_linux before compat_32).
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.soname)?;
        if self.compat_linux {
            write!(fmt, ":Linux")?;
        }
        if self.compat_32 {
            write!(fmt, ":32")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("libc.so.7")]
    #[case("libSystem.B.dylib")]
    fn soname_roundtrip(#[case] input: &str) {
        assert_eq!(Soname::from_str(input).unwrap().to_string(), input);
    }

    #[rstest]
    fn soname_rejects_empty() {
        assert!(Soname::from_str("").is_err());
    }

    #[rstest]
    fn shared_library_dependency_display() {
        let dep = SharedLibraryDependency::new(Soname::from_str("libc.so.7").unwrap(), true, false);
        assert_eq!(dep.to_string(), "libc.so.7:32");
    }

    #[rstest]
    fn shared_library_dependency_display_linux_before_32() {
        let dep = SharedLibraryDependency::new(Soname::from_str("libc.so.6").unwrap(), true, true);
        assert_eq!(dep.to_string(), "libc.so.6:Linux:32");
    }
}
