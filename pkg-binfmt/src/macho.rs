//! Mach-O and FAT/Universal binary parsing.
//!
//! Deliberately hand-rolled rather than driven through a higher-level Mach-O crate: the header
//! and load-command layouts are small, fixed, and this calls for exactly this shape (Design
//! Notes §9, "Variable-length union header parsing" — typed sums over `MachOHeader{32,64}` /
//! `FatHeader{32,64}` with explicit endianness conversion, no casts into mapped memory).

use pkg_types::Abi;
use pkg_types::Arch;
use pkg_types::Os;

use crate::Error;

const MH_MAGIC: u32 = 0xfeed_face;
const MH_CIGAM: u32 = 0xcefa_edfe;
const MH_MAGIC_64: u32 = 0xfeed_facf;
const MH_CIGAM_64: u32 = 0xcffa_edfe;
const FAT_MAGIC: u32 = 0xcafe_babe;
const FAT_CIGAM: u32 = 0xbeba_feca;
const FAT_MAGIC_64: u32 = 0xcafe_babf;
const FAT_CIGAM_64: u32 = 0xbfba_feca;

const CPU_ARCH_ABI64: u32 = 0x0100_0000;
const CPU_TYPE_X86: u32 = 7;
const CPU_TYPE_X86_64: u32 = CPU_TYPE_X86 | CPU_ARCH_ABI64;
const CPU_TYPE_ARM: u32 = 12;
const CPU_TYPE_ARM64: u32 = CPU_TYPE_ARM | CPU_ARCH_ABI64;
const CPU_TYPE_POWERPC: u32 = 18;
const CPU_TYPE_POWERPC64: u32 = CPU_TYPE_POWERPC | CPU_ARCH_ABI64;

const CPU_SUBTYPE_MASK: u32 = 0x00ff_ffff;
const CPU_SUBTYPE_ARM_V6: u32 = 6;
const CPU_SUBTYPE_ARM_V6M: u32 = 14;
const CPU_SUBTYPE_ARM_V7: u32 = 9;
const CPU_SUBTYPE_ARM_V7S: u32 = 11;
const CPU_SUBTYPE_ARM_V7K: u32 = 12;
const CPU_SUBTYPE_ARM_V7M: u32 = 15;
const CPU_SUBTYPE_ARM_V7EM: u32 = 16;

const LC_REQ_DYLD: u32 = 0x8000_0000;
const LC_ID_DYLIB: u32 = 0x0d;
const LC_LOAD_DYLIB: u32 = 0x0c;
const LC_LOAD_WEAK_DYLIB: u32 = 0x18 | LC_REQ_DYLD;
const LC_REEXPORT_DYLIB: u32 = 0x1f | LC_REQ_DYLD;
const LC_LAZY_LOAD_DYLIB: u32 = 0x20;
const LC_LOAD_UPWARD_DYLIB: u32 = 0x23 | LC_REQ_DYLD;
const LC_VERSION_MIN_MACOSX: u32 = 0x24;
const LC_VERSION_MIN_IPHONEOS: u32 = 0x25;
const LC_VERSION_MIN_TVOS: u32 = 0x2f;
const LC_VERSION_MIN_WATCHOS: u32 = 0x30;
const LC_BUILD_VERSION: u32 = 0x32;

const PLATFORM_MACOS: u32 = 1;
const PLATFORM_IOS: u32 = 2;
const PLATFORM_TVOS: u32 = 3;
const PLATFORM_WATCHOS: u32 = 4;

/// A required or provided dylib reference found in a Mach-O slice's load commands.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DylibRef {
    /// The dylib's basename (path prefix stripped), suffixed with its current version.
    pub name: String,
    /// The dylib's full, unmodified load path (used for the "base shlib" allowlist check).
    pub path: String,
}

/// The result of analyzing one Mach-O thin slice.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MachoAnalysis {
    /// The target ABI, derived from cpu_type/subtype and `LC_BUILD_VERSION`/`LC_VERSION_MIN_*`.
    pub abi: Option<Abi>,
    /// The dylib this slice identifies as (`LC_ID_DYLIB`), if it is itself a shared library.
    pub provided: Option<DylibRef>,
    /// Dylibs this slice loads (`LC_LOAD_DYLIB` and its weak/lazy/upward/reexport variants).
    pub required: Vec<DylibRef>,
}

struct ByteReader<'a> {
    data: &'a [u8],
    little_endian: bool,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8], little_endian: bool) -> Self {
        Self { data, little_endian }
    }

    fn u32_at(&self, offset: usize) -> Result<u32, Error> {
        let bytes: [u8; 4] = self
            .data
            .get(offset..offset + 4)
            .ok_or(Error::Truncated { offset, needed: 4, available: self.data.len().saturating_sub(offset) })?
            .try_into()
            .expect("slice is exactly 4 bytes");
        Ok(if self.little_endian { u32::from_le_bytes(bytes) } else { u32::from_be_bytes(bytes) })
    }

    fn u64_at(&self, offset: usize) -> Result<u64, Error> {
        let bytes: [u8; 8] = self
            .data
            .get(offset..offset + 8)
            .ok_or(Error::Truncated { offset, needed: 8, available: self.data.len().saturating_sub(offset) })?
            .try_into()
            .expect("slice is exactly 8 bytes");
        Ok(if self.little_endian { u64::from_le_bytes(bytes) } else { u64::from_be_bytes(bytes) })
    }

    fn cstr_at(&self, offset: usize) -> String {
        match self.data.get(offset..) {
            Some(rest) => {
                let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
                String::from_utf8_lossy(&rest[..end]).into_owned()
            }
            None => String::new(),
        }
    }
}

/// One `fat_arch`/`fat_arch_64` entry: the byte range of a thin slice within a FAT container.
#[derive(Clone, Copy, Debug)]
struct FatArchEntry {
    cputype: u32,
    cpusubtype: u32,
    offset: u64,
    size: u64,
}

/// Parses a Mach-O or FAT/Universal binary, selecting a single thin slice to analyze.
///
/// `arch_hint` (e.g. `"amd64"`/`"aarch64"`) selects which FAT slice to inspect; absent a hint,
/// the first slice is used and a debug line notes when more than one was present.
///
/// # Errors
///
/// Returns [`Error::UnknownFormat`] if the magic is not one of the eight Mach-O/FAT magics, or
/// [`Error::Truncated`]/[`Error::EmptyFatBinary`] if the container is malformed.
pub fn analyze_macho(bytes: &[u8], arch_hint: Option<&str>) -> Result<MachoAnalysis, Error> {
    let magic = u32::from_be_bytes(
        bytes.get(0..4).ok_or(Error::Truncated { offset: 0, needed: 4, available: bytes.len() })?.try_into().unwrap(),
    );

    match magic {
        FAT_MAGIC | FAT_CIGAM | FAT_MAGIC_64 | FAT_CIGAM_64 => {
            let is_64 = magic == FAT_MAGIC_64 || magic == FAT_CIGAM_64;
            // The FAT header itself (magic + nfat_arch) is always big-endian in the file; only
            // the CIGAM variants are the byte-swapped spelling a little-endian host would see.
            let swapped = magic == FAT_CIGAM || magic == FAT_CIGAM_64;
            let header_reader = ByteReader::new(bytes, !swapped);
            let nfat_arch = header_reader.u32_at(4)?;

            let mut arches = Vec::with_capacity(nfat_arch as usize);
            let entry_size = if is_64 { 32 } else { 20 };
            for i in 0..nfat_arch as usize {
                let base = 8 + i * entry_size;
                let cputype = header_reader.u32_at(base)?;
                let cpusubtype = header_reader.u32_at(base + 4)?;
                let (offset, size) = if is_64 {
                    (header_reader.u64_at(base + 8)?, header_reader.u64_at(base + 16)?)
                } else {
                    (header_reader.u32_at(base + 8)? as u64, header_reader.u32_at(base + 12)? as u64)
                };
                arches.push(FatArchEntry { cputype, cpusubtype, offset, size });
            }

            if arches.is_empty() {
                return Err(Error::EmptyFatBinary);
            }

            if arches.len() > 1 {
                log::debug!("binfmt: FAT binary has {} arch slices", arches.len());
            }

            let chosen = arch_hint
                .and_then(|hint| arches.iter().find(|a| arch_from_cpu(a.cputype, a.cpusubtype).map(|a| a.to_string()) == Some(hint.to_string())))
                .unwrap_or(&arches[0]);

            let start = chosen.offset as usize;
            let end = start.saturating_add(chosen.size as usize);
            let slice = bytes.get(start..end).ok_or(Error::Truncated { offset: start, needed: chosen.size as usize, available: bytes.len() })?;
            analyze_thin(slice)
        }
        MH_MAGIC | MH_CIGAM | MH_MAGIC_64 | MH_CIGAM_64 => analyze_thin(bytes),
        other => Err(Error::UnknownFormat(other)),
    }
}

fn analyze_thin(bytes: &[u8]) -> Result<MachoAnalysis, Error> {
    let magic = u32::from_be_bytes(
        bytes.get(0..4).ok_or(Error::Truncated { offset: 0, needed: 4, available: bytes.len() })?.try_into().unwrap(),
    );
    let (is_64, little_endian) = match magic {
        MH_MAGIC => (false, false),
        MH_CIGAM => (false, true),
        MH_MAGIC_64 => (true, false),
        MH_CIGAM_64 => (true, true),
        other => return Err(Error::UnknownFormat(other)),
    };

    let reader = ByteReader::new(bytes, little_endian);
    let cputype = reader.u32_at(4)?;
    let cpusubtype = reader.u32_at(8)?;
    let ncmds = reader.u32_at(16)?;
    let header_size = if is_64 { 32 } else { 28 };

    let arch = arch_from_cpu(cputype, cpusubtype);

    let mut provided = None;
    let mut required = Vec::new();
    let mut os_version: Option<(u32, u32, u32)> = None;
    let mut platform = PLATFORM_MACOS;

    let mut offset = header_size;
    for _ in 0..ncmds {
        let cmd = reader.u32_at(offset)?;
        let cmdsize = reader.u32_at(offset + 4)? as usize;
        if cmdsize < 8 {
            break;
        }

        match cmd {
            LC_ID_DYLIB | LC_LOAD_DYLIB | LC_LOAD_WEAK_DYLIB | LC_REEXPORT_DYLIB | LC_LAZY_LOAD_DYLIB | LC_LOAD_UPWARD_DYLIB => {
                let name_offset = reader.u32_at(offset + 8)? as usize;
                let version = reader.u32_at(offset + 16)?;
                let raw_path = reader.cstr_at(offset + name_offset);
                let basename = strip_rpath_prefix(&raw_path);
                let name = format!("{basename}-{}", format_packed_version(version));
                let dylib = DylibRef { name, path: raw_path };
                if cmd == LC_ID_DYLIB {
                    provided = Some(dylib);
                } else {
                    required.push(dylib);
                }
            }
            LC_BUILD_VERSION => {
                platform = reader.u32_at(offset + 8)?;
                let minos = reader.u32_at(offset + 12)?;
                os_version = Some(unpack_version(minos));
            }
            LC_VERSION_MIN_MACOSX if os_version.is_none() => {
                platform = PLATFORM_MACOS;
                os_version = Some(unpack_version(reader.u32_at(offset + 8)?));
            }
            LC_VERSION_MIN_IPHONEOS if os_version.is_none() => {
                platform = PLATFORM_IOS;
                os_version = Some(unpack_version(reader.u32_at(offset + 8)?));
            }
            LC_VERSION_MIN_TVOS if os_version.is_none() => {
                platform = PLATFORM_TVOS;
                os_version = Some(unpack_version(reader.u32_at(offset + 8)?));
            }
            LC_VERSION_MIN_WATCHOS if os_version.is_none() => {
                platform = PLATFORM_WATCHOS;
                os_version = Some(unpack_version(reader.u32_at(offset + 8)?));
            }
            _ => {}
        }

        offset += cmdsize;
    }

    let abi = match (os_version, arch) {
        (Some((major, minor, patch)), Some(arch)) => {
            let (darwin_major, darwin_minor, darwin_patch) = darwin_version(platform, major, minor, patch);
            Some(Abi::with_full_version(Os::Darwin, darwin_major, Some(darwin_minor), Some(darwin_patch), arch))
        }
        _ => None,
    };

    Ok(MachoAnalysis { abi, provided, required })
}

fn arch_from_cpu(cputype: u32, cpusubtype: u32) -> Option<Arch> {
    let subtype = cpusubtype & CPU_SUBTYPE_MASK;
    match cputype {
        CPU_TYPE_ARM64 => Some(Arch::Aarch64),
        CPU_TYPE_ARM => match subtype {
            CPU_SUBTYPE_ARM_V6 | CPU_SUBTYPE_ARM_V6M => Some(Arch::Armv6),
            CPU_SUBTYPE_ARM_V7 | CPU_SUBTYPE_ARM_V7S | CPU_SUBTYPE_ARM_V7K | CPU_SUBTYPE_ARM_V7M | CPU_SUBTYPE_ARM_V7EM => {
                Some(Arch::Armv7)
            }
            _ => Some(Arch::Armv7),
        },
        CPU_TYPE_POWERPC64 => Some(Arch::Powerpc64),
        CPU_TYPE_POWERPC => Some(Arch::Powerpc),
        CPU_TYPE_X86_64 => Some(Arch::Amd64),
        CPU_TYPE_X86 => Some(Arch::I386),
        _ => None,
    }
}

/// Strips `@executable_path/`, `@loader_path/`, `@rpath/` and any directory prefix, leaving the
/// dylib's basename.
fn strip_rpath_prefix(path: &str) -> &str {
    for prefix in ["@executable_path/", "@loader_path/", "@rpath/"] {
        if let Some(rest) = path.strip_prefix(prefix) {
            return rest.rsplit('/').next().unwrap_or(rest);
        }
    }
    path.rsplit('/').next().unwrap_or(path)
}

/// Mach-O packs `X.Y.Z` as `(X << 16) | (Y << 8) | Z`.
fn unpack_version(packed: u32) -> (u32, u32, u32) {
    (packed >> 16, (packed >> 8) & 0xff, packed & 0xff)
}

fn format_packed_version(packed: u32) -> String {
    let (major, minor, patch) = unpack_version(packed);
    if patch == 0 {
        format!("{major}.{minor}")
    } else {
        format!("{major}.{minor}.{patch}")
    }
}

/// Maps a platform's `minos` version triple to the Darwin kernel version it corresponds to.
///
/// Exact per macOS (major ≥ 11: Darwin = major + 9; 10.x: Darwin = minor + 4, matching spec's
/// worked example "macOS 14.3 → Darwin 23.3.0"). iOS/tvOS use the same `+9`-family offset from
/// their own major version post-unification; watchOS uses the documented `major + 13` offset.
/// These offsets are approximations for iOS/tvOS/bridgeOS — see DESIGN.md.
fn darwin_version(platform: u32, major: u32, minor: u32, patch: u32) -> (u32, u32, u32) {
    let darwin_major = match platform {
        PLATFORM_MACOS if major >= 11 => major + 9,
        PLATFORM_MACOS => minor + 4,
        PLATFORM_WATCHOS => major + 13,
        PLATFORM_IOS | PLATFORM_TVOS => major + 6,
        _ => major,
    };
    (darwin_major, minor, patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_version_roundtrip() {
        assert_eq!(unpack_version(0x00_0e03_00), (14, 3, 0));
    }

    #[test]
    fn darwin_version_macos_14_3() {
        assert_eq!(darwin_version(PLATFORM_MACOS, 14, 3, 0), (23, 3, 0));
    }

    #[test]
    fn darwin_version_watchos_uses_plus_13() {
        assert_eq!(darwin_version(PLATFORM_WATCHOS, 10, 0, 0).0, 23);
    }

    #[test]
    fn strip_rpath_prefix_variants() {
        assert_eq!(strip_rpath_prefix("@rpath/libfoo.dylib"), "libfoo.dylib");
        assert_eq!(strip_rpath_prefix("/usr/lib/libSystem.B.dylib"), "libSystem.B.dylib");
        assert_eq!(strip_rpath_prefix("@executable_path/../Frameworks/Foo.framework/Foo"), "Foo");
    }

    #[test]
    fn arch_from_cpu_x86_64_abi64() {
        assert_eq!(arch_from_cpu(CPU_TYPE_X86_64, 3), Some(Arch::Amd64));
    }

    /// Builds a minimal thin 64-bit little-endian Mach-O with one `LC_BUILD_VERSION` load
    /// command (macOS 14.3.0).
    #[test]
    fn analyze_thin_matches_s6_scenario() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MH_MAGIC_64.to_be_bytes());
        bytes.extend_from_slice(&CPU_TYPE_X86_64.to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes()); // CPU_SUBTYPE_X86_ALL
        bytes.extend_from_slice(&2u32.to_le_bytes()); // filetype (MH_EXECUTE)
        bytes.extend_from_slice(&1u32.to_le_bytes()); // ncmds
        let cmdsize = 24u32; // build_version_command, ntools=0
        bytes.extend_from_slice(&cmdsize.to_le_bytes()); // sizeofcmds
        bytes.extend_from_slice(&0u32.to_le_bytes()); // flags
        bytes.extend_from_slice(&0u32.to_le_bytes()); // reserved
        assert_eq!(bytes.len(), 32, "64-bit mach_header is 32 bytes");

        bytes.extend_from_slice(&LC_BUILD_VERSION.to_le_bytes());
        bytes.extend_from_slice(&cmdsize.to_le_bytes());
        bytes.extend_from_slice(&PLATFORM_MACOS.to_le_bytes());
        bytes.extend_from_slice(&((14u32 << 16) | (3 << 8)).to_le_bytes()); // minos 14.3.0
        bytes.extend_from_slice(&0u32.to_le_bytes()); // sdk
        bytes.extend_from_slice(&0u32.to_le_bytes()); // ntools

        let analysis = analyze_thin(&bytes).unwrap();
        let abi = analysis.abi.expect("abi detected");
        assert_eq!(abi.os(), Os::Darwin);
        assert_eq!(abi.major(), 23);
        assert_eq!(abi.patch(), Some(0));
        assert_eq!(abi.arch(), Arch::Amd64);
    }
}
