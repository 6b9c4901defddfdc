//! Application Binary Interface identification.
//!
//! An [`Abi`] pins a package to the operating system, kernel ABI version and CPU architecture
//! it was built for, in the wire form `OS:major[.minor]:arch`. Whether the minor version is
//! part of the wire form depends on the operating system: FreeBSD, NetBSD and Darwin only ever
//! break ABI on a major release and so encode the major version alone, while DragonFly and
//! Linux encode `major.minor`.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use pkg_parsers::iter_str_context;
use serde::Deserialize;
use serde::Serialize;
use strum::Display as StrumDisplay;
use strum::EnumString;
use strum::VariantNames;
use winnow::ModalResult;
use winnow::Parser;
use winnow::combinator::cut_err;
use winnow::combinator::opt;
use winnow::combinator::preceded;
use winnow::error::StrContext;
use winnow::error::StrContextValue;
use winnow::token::take_while;

use crate::Error;

/// The operating system a package was built for.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, StrumDisplay, EnumString, VariantNames,
)]
pub enum Os {
    /// No recognized OS could be determined.
    #[default]
    #[strum(serialize = "Unknown")]
    #[serde(rename = "Unknown")]
    Unknown,
    /// FreeBSD and its derivatives.
    #[strum(serialize = "FreeBSD")]
    #[serde(rename = "FreeBSD")]
    FreeBSD,
    /// DragonFly BSD.
    #[strum(serialize = "DragonFly")]
    #[serde(rename = "DragonFly")]
    DragonFly,
    /// Linux.
    #[strum(serialize = "Linux")]
    #[serde(rename = "Linux")]
    Linux,
    /// NetBSD.
    #[strum(serialize = "NetBSD")]
    #[serde(rename = "NetBSD")]
    NetBSD,
    /// Darwin (macOS).
    #[strum(serialize = "Darwin")]
    #[serde(rename = "Darwin")]
    Darwin,
}

impl Os {
    /// Returns whether this OS encodes a minor ABI version in addition to the major one.
    fn includes_minor(&self) -> bool {
        matches!(self, Os::DragonFly | Os::Linux)
    }
}

/// The CPU architecture a package was built for.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, StrumDisplay, EnumString, VariantNames,
)]
pub enum Arch {
    /// No recognized architecture could be determined.
    #[default]
    #[strum(serialize = "Unknown")]
    #[serde(rename = "Unknown")]
    Unknown,
    /// Intel/AMD 64-bit.
    #[strum(serialize = "amd64")]
    #[serde(rename = "amd64")]
    Amd64,
    /// Intel 32-bit.
    #[strum(serialize = "i386")]
    #[serde(rename = "i386")]
    I386,
    /// ARMv8 64-bit.
    #[strum(serialize = "aarch64")]
    #[serde(rename = "aarch64")]
    Aarch64,
    /// ARMv7.
    #[strum(serialize = "armv7")]
    #[serde(rename = "armv7")]
    Armv7,
    /// ARMv6.
    #[strum(serialize = "armv6")]
    #[serde(rename = "armv6")]
    Armv6,
    /// 32-bit PowerPC.
    #[strum(serialize = "powerpc")]
    #[serde(rename = "powerpc")]
    Powerpc,
    /// 64-bit PowerPC.
    #[strum(serialize = "powerpc64")]
    #[serde(rename = "powerpc64")]
    Powerpc64,
    /// 64-bit PowerPC, little-endian.
    #[strum(serialize = "powerpc64le")]
    #[serde(rename = "powerpc64le")]
    Powerpc64le,
    /// RISC-V 32-bit.
    #[strum(serialize = "riscv32")]
    #[serde(rename = "riscv32")]
    Riscv32,
    /// RISC-V 64-bit.
    #[strum(serialize = "riscv64")]
    #[serde(rename = "riscv64")]
    Riscv64,
}

/// The ABI a package was built against: operating system, kernel ABI version and CPU
/// architecture, in the wire form `OS:major[.minor]:arch`.
///
/// ## Examples
/// ```
/// use pkg_types::{Abi, Arch, Os};
/// use std::str::FromStr;
///
/// let abi = Abi::from_str("FreeBSD:14:amd64").unwrap();
/// assert_eq!(abi.os(), Os::FreeBSD);
/// assert_eq!(abi.major(), 14);
/// assert_eq!(abi.minor(), None);
/// assert_eq!(abi.arch(), Arch::Amd64);
/// assert_eq!(abi.to_string(), "FreeBSD:14:amd64");
///
/// let abi = Abi::from_str("Linux:5.15:aarch64").unwrap();
/// assert_eq!(abi.minor(), Some(15));
/// assert_eq!(abi.to_string(), "Linux:5.15:aarch64");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Abi {
    os: Os,
    major: u32,
    minor: Option<u32>,
    /// A patch version, carried for OS families whose minor is itself dropped from the wire
    /// string (e.g. a Mach-O-derived Darwin ABI's full `major.minor.patch` kernel version).
    /// Never round-tripped through [`Abi::parser`]/[`Display`]; wire form is always
    /// `OS:major[.minor]:arch`.
    patch: Option<u32>,
    arch: Arch,
}

impl Abi {
    /// Creates a new [`Abi`], dropping or requiring the minor version as dictated by `os`.
    pub fn new(os: Os, major: u32, minor: Option<u32>, arch: Arch) -> Abi {
        let minor = if os.includes_minor() { minor } else { None };
        Abi {
            os,
            major,
            minor,
            patch: None,
            arch,
        }
    }

    /// Attaches a patch version, e.g. the third component of a Mach-O `minos` triple. Purely
    /// informational: never part of the wire string form.
    pub fn with_patch(mut self, patch: u32) -> Abi {
        self.patch = Some(patch);
        self
    }

    /// Creates an [`Abi`] retaining the full `major.minor.patch` triple regardless of whether
    /// `os` drops the minor from its wire string form.
    ///
    /// Binary-format analyzers derive a full version triple from a Mach-O `minos`
    /// value or an ELF ABI note even for OS families whose *textual* ABI form only ever carries
    /// the major version (FreeBSD/NetBSD/Darwin); that richer internal detail is worth keeping
    /// even though [`Display`] never emits it.
    pub fn with_full_version(os: Os, major: u32, minor: Option<u32>, patch: Option<u32>, arch: Arch) -> Abi {
        Abi { os, major, minor, patch, arch }
    }

    /// Returns the patch version, if one was attached via [`Abi::with_patch`].
    pub fn patch(&self) -> Option<u32> {
        self.patch
    }

    /// Returns the operating system.
    pub fn os(&self) -> Os {
        self.os
    }

    /// Returns the major ABI version.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor ABI version, if this OS encodes one.
    pub fn minor(&self) -> Option<u32> {
        self.minor
    }

    /// Returns the CPU architecture.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Recognizes an [`Abi`] in an input string, consuming all input.
    pub fn parser(input: &mut &str) -> ModalResult<Abi> {
        let os = cut_err(take_while(1.., |c: char| c != ':').try_map(Os::from_str))
            .context(StrContext::Label("operating system"))
            .context_with(iter_str_context!([Os::VARIANTS]))
            .parse_next(input)?;
        let _ = ':'.parse_next(input)?;
        let major = cut_err(take_while(1.., |c: char| c.is_ascii_digit()).try_map(|s: &str| s.parse::<u32>()))
            .context(StrContext::Label("major ABI version"))
            .parse_next(input)?;
        let minor = opt(preceded(
            '.',
            cut_err(take_while(1.., |c: char| c.is_ascii_digit()).try_map(|s: &str| s.parse::<u32>()))
                .context(StrContext::Label("minor ABI version")),
        ))
        .parse_next(input)?;
        let _ = cut_err(':'.context(StrContext::Expected(StrContextValue::CharLiteral(':'))))
            .parse_next(input)?;
        let arch = cut_err(take_while(1.., |_| true).try_map(Arch::from_str))
            .context(StrContext::Label("architecture"))
            .context_with(iter_str_context!([Arch::VARIANTS]))
            .parse_next(input)?;
        Ok(Abi::new(os, major, minor, arch))
    }
}

impl FromStr for Abi {
    type Err = Error;
    fn from_str(input: &str) -> Result<Abi, Self::Err> {
        Abi::parser
            .parse(input)
            .map_err(|_| Error::InvalidAbi(input.to_string()))
    }
}

impl Display for Abi {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        match (self.os.includes_minor(), self.minor) {
            (true, Some(minor)) => write!(fmt, "{}:{}.{}:{}", self.os, self.major, minor, self.arch),
            _ => write!(fmt, "{}:{}:{}", self.os, self.major, self.arch),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("FreeBSD:14:amd64", Os::FreeBSD, 14, None, Arch::Amd64)]
    #[case("FreeBSD:14.5:amd64", Os::FreeBSD, 14, None, Arch::Amd64)]
    #[case("Linux:5.15:aarch64", Os::Linux, 5, Some(15), Arch::Aarch64)]
    #[case("DragonFly:6.4:amd64", Os::DragonFly, 6, Some(4), Arch::Amd64)]
    #[case("Darwin:23:aarch64", Os::Darwin, 23, None, Arch::Aarch64)]
    #[case("NetBSD:10:amd64", Os::NetBSD, 10, None, Arch::Amd64)]
    fn abi_from_string(
        #[case] input: &str,
        #[case] os: Os,
        #[case] major: u32,
        #[case] minor: Option<u32>,
        #[case] arch: Arch,
    ) {
        let abi = Abi::from_str(input).unwrap();
        assert_eq!(abi.os(), os);
        assert_eq!(abi.major(), major);
        assert_eq!(abi.minor(), minor);
        assert_eq!(abi.arch(), arch);
    }

    #[rstest]
    #[case("FreeBSD:14:amd64")]
    #[case("Linux:5.15:aarch64")]
    fn abi_roundtrip(#[case] input: &str) {
        assert_eq!(Abi::from_str(input).unwrap().to_string(), input);
    }

    #[rstest]
    #[case("")]
    #[case("FreeBSD")]
    #[case("FreeBSD:abc:amd64")]
    #[case("Solaris:11:amd64")]
    fn abi_invalid(#[case] input: &str) {
        assert!(matches!(Abi::from_str(input), Err(Error::InvalidAbi(_))));
    }
}
