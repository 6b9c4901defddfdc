#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

//! ELF and Mach-O/FAT binary analysis: ABI detection and shared-library dependency extraction
//!.
//!
//! [`analyze`] reads one binary file and returns a [`BinaryAnalysis`]: the target [`Abi`] (when
//! the file carries a recognizable OS/version note), the [`Soname`] it provides (if it is
//! itself a shared library), and the raw list of libraries it requires. Classifying those
//! requirements against a host ABI (`compat_32`/`compat_linux`) and running the cleanup pass are
//! the caller's job — see [`cleanup`] and [`classify`].

pub mod cleanup;
mod elf;
mod error;
mod macho;

pub use cleanup::IgnoreList;
pub use cleanup::SystemShlib;
pub use cleanup::scan_system_shlibs;
pub use elf::ElfAnalysis;
pub use elf::analyze_elf;
pub use error::Error;
pub use macho::DylibRef;
pub use macho::MachoAnalysis;
pub use macho::analyze_macho;

use std::fs;
use std::path::Path;

use pkg_types::Abi;
use pkg_types::Os;
use pkg_types::SharedLibraryDependency;
use pkg_types::Soname;

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// The outcome of analyzing one binary file: its target ABI (if recognizable) and the sonames
/// it provides/requires, already classified against `host_abi`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BinaryAnalysis {
    /// The target ABI, if determinable.
    pub abi: Option<Abi>,
    /// The soname this binary provides, if it is itself a shared library.
    pub provided: Option<Soname>,
    /// The shared libraries this binary requires, classified against the host ABI.
    pub required: Vec<SharedLibraryDependency>,
}

/// Analyzes a binary file on disk, dispatching on its magic to the ELF or Mach-O/FAT reader.
///
/// `host_abi`, when given, classifies each required library's `compat_32`/`compat_linux` flags
/// by comparing the binary's own detected ABI against the host's.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its format is unrecognized/malformed.
pub fn analyze(path: &Path, host_abi: Option<&Abi>, arch_hint: Option<&str>) -> Result<BinaryAnalysis, Error> {
    let bytes = fs::read(path).map_err(|source| Error::IoPath { path: path.to_path_buf(), context: "reading binary", source })?;
    analyze_bytes(&bytes, host_abi, arch_hint)
}

/// As [`analyze`], operating on an in-memory buffer.
///
/// # Errors
///
/// Returns [`Error::UnknownFormat`] if the first four bytes match neither an ELF nor a Mach-O/
/// FAT magic, or a parse error from the underlying format reader.
pub fn analyze_bytes(bytes: &[u8], host_abi: Option<&Abi>, arch_hint: Option<&str>) -> Result<BinaryAnalysis, Error> {
    if bytes.starts_with(&ELF_MAGIC) {
        let analysis = elf::analyze_elf(bytes)?;
        let required = analysis
            .needed
            .into_iter()
            .map(|name| Soname::new(name).map_err(Error::from))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|soname| classify(soname, analysis.abi.as_ref(), host_abi))
            .collect();
        let provided = analysis.soname.map(Soname::new).transpose()?;
        return Ok(BinaryAnalysis { abi: analysis.abi, provided, required });
    }

    let analysis = macho::analyze_macho(bytes, arch_hint)?;
    let required = analysis
        .required
        .into_iter()
        .filter(|dylib| allow_dylib(dylib, false))
        .map(|dylib| Soname::new(dylib.name).map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|soname| classify(soname, analysis.abi.as_ref(), host_abi))
        .collect();
    let provided = analysis.provided.map(|dylib| Soname::new(dylib.name)).transpose()?;

    Ok(BinaryAnalysis { abi: analysis.abi, provided, required })
}

/// Filters out dylibs that live under `/System/`, `/usr/lib/`, or `/lib/` unless
/// `allow_base_shlibs` is set.
fn allow_dylib(dylib: &DylibRef, allow_base_shlibs: bool) -> bool {
    allow_base_shlibs || !["/System/", "/usr/lib/", "/lib/"].iter().any(|prefix| dylib.path.starts_with(prefix))
}

/// Classifies a required soname's `compat_32`/`compat_linux` flags by comparing the binary's own
/// ABI against `host_abi`.
fn classify(soname: Soname, binary_abi: Option<&Abi>, host_abi: Option<&Abi>) -> SharedLibraryDependency {
    let (compat_32, compat_linux) = match (binary_abi, host_abi) {
        (Some(binary), Some(host)) => {
            let compat_linux = binary.os() == Os::Linux && host.os() != Os::Linux;
            let compat_32 = is_32_bit(binary.arch()) && !is_32_bit(host.arch());
            (compat_32, compat_linux)
        }
        _ => (false, false),
    };
    SharedLibraryDependency::new(soname, compat_32, compat_linux)
}

fn is_32_bit(arch: pkg_types::Arch) -> bool {
    matches!(
        arch,
        pkg_types::Arch::I386
            | pkg_types::Arch::Armv6
            | pkg_types::Arch::Armv7
            | pkg_types::Arch::Powerpc
            | pkg_types::Arch::Riscv32
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::Arch;

    #[test]
    fn classify_marks_compat_linux_and_compat_32() {
        let host = Abi::new(Os::FreeBSD, 14, None, Arch::Amd64);
        let binary = Abi::new(Os::Linux, 5, Some(15), Arch::Aarch64);
        let dep = classify(Soname::new("libfoo.so".into()).unwrap(), Some(&binary), Some(&host));
        assert!(dep.compat_linux);
        assert!(!dep.compat_32);
    }

    #[test]
    fn classify_marks_compat_32_for_i386_shlib_on_amd64_host() {
        let host = Abi::new(Os::FreeBSD, 14, None, Arch::Amd64);
        let binary = Abi::new(Os::FreeBSD, 14, None, Arch::I386);
        let dep = classify(Soname::new("libfoo.so".into()).unwrap(), Some(&binary), Some(&host));
        assert!(dep.compat_32);
        assert!(!dep.compat_linux);
    }

    #[test]
    fn analyze_bytes_rejects_unknown_magic() {
        let err = analyze_bytes(&[0, 0, 0, 0], None, None).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(_)));
    }
}
