//! ELF header, dynamic-section and note parsing.
//!
//! Soname extraction rides on `goblin`'s dynamic-section walk (`DT_SONAME`/`DT_NEEDED`);
//! ABI derivation reads `e_machine` for the architecture and the `PT_NOTE` segments for the
//! target OS and version, since neither is exposed as a convenience field by the ELF crate.

use goblin::elf::Elf;
use goblin::elf::program_header::PT_NOTE;
use log::debug;
use log::trace;
use pkg_types::Abi;
use pkg_types::Arch;
use pkg_types::Os;

use crate::Error;

/// EI_DATA: little-endian.
const ELFDATA2LSB: u8 = 1;

/// The result of analyzing one ELF file: its target ABI (if determinable) and the shared
/// libraries it provides/requires, as raw names (compat flags are computed by the caller, which
/// knows the host/process ABI to compare against).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ElfAnalysis {
    /// The target ABI, if a recognizable note was present.
    pub abi: Option<Abi>,
    /// The `DT_SONAME` entry, if this is a shared library.
    pub soname: Option<String>,
    /// The `DT_NEEDED` entries.
    pub needed: Vec<String>,
}

/// Parses an ELF file's dynamic section and ABI notes.
///
/// # Errors
///
/// Returns an error if `goblin` cannot parse the ELF structure.
pub fn analyze_elf(bytes: &[u8]) -> Result<ElfAnalysis, Error> {
    let elf = Elf::parse(bytes)?;
    debug!("binfmt: detected ELF, e_machine={}", elf.header.e_machine);

    let arch = arch_from_machine(&elf, bytes);
    let os_version = note_abi(&elf, bytes);

    let abi = match (os_version, arch) {
        (Some((os, major, minor)), Some(arch)) => Some(Abi::new(os, major, minor, arch)),
        _ => None,
    };

    Ok(ElfAnalysis {
        abi,
        soname: elf.soname.map(str::to_string),
        needed: elf.libraries.iter().map(|s| s.to_string()).collect(),
    })
}

/// `EF_ARM_EABI_UNKNOWN` mask covering the EABI version nibble of `e_flags`.
const EF_ARM_EABIMASK: u32 = 0xff00_0000;

fn arch_from_machine(elf: &Elf, bytes: &[u8]) -> Option<Arch> {
    use goblin::elf::header as eh;

    match elf.header.e_machine {
        eh::EM_X86_64 => Some(Arch::Amd64),
        eh::EM_386 => Some(Arch::I386),
        eh::EM_AARCH64 => Some(Arch::Aarch64),
        eh::EM_ARM => {
            // EABI version lives in the top nibble of e_flags; ARMv6 vs ARMv7 is otherwise only
            // recoverable from .ARM.attributes, which we approximate via e_flags' Tag_CPU_arch
            // convention: treat an EABI5 binary with the v7 bit as armv7, else armv6.
            let eabi = elf.header.e_flags & EF_ARM_EABIMASK;
            trace!("binfmt: ARM e_flags={:#x} eabi={:#x}", elf.header.e_flags, eabi);
            if arm_attributes_indicate_v7(elf, bytes) {
                Some(Arch::Armv7)
            } else {
                Some(Arch::Armv6)
            }
        }
        eh::EM_PPC => Some(Arch::Powerpc),
        eh::EM_PPC64 => {
            if elf.little_endian {
                Some(Arch::Powerpc64le)
            } else {
                Some(Arch::Powerpc64)
            }
        }
        eh::EM_RISCV => {
            if elf.is_64 {
                Some(Arch::Riscv64)
            } else {
                Some(Arch::Riscv32)
            }
        }
        _ => None,
    }
}

/// Looks for a `.ARM.attributes` section and checks its `Tag_CPU_arch` value for a v7-or-later
/// encoding. Returns `false` (armv6) if the section is absent or unparseable.
fn arm_attributes_indicate_v7(elf: &Elf, bytes: &[u8]) -> bool {
    let Some(section) = elf
        .section_headers
        .iter()
        .find(|sh| elf.shdr_strtab.get_at(sh.sh_name) == Some(".ARM.attributes"))
    else {
        return false;
    };
    let start = section.sh_offset as usize;
    let end = start.saturating_add(section.sh_size as usize);
    let Some(data) = bytes.get(start..end) else {
        return false;
    };
    // Tag_CPU_arch (tag 6) values >= 10 (ARMv7) indicate a v7 baseline; this is a coarse scan
    // for the tag byte rather than a full attribute-section parser.
    data.windows(2).any(|w| w[0] == 6 && w[1] >= 10)
}

/// Parses `PT_NOTE` segments looking for a FreeBSD/NetBSD/DragonFly ABI-version note or a GNU
/// ABI tag note, returning `(os, major, minor)`.
fn note_abi(elf: &Elf, bytes: &[u8]) -> Option<(Os, u32, Option<u32>)> {
    let little_endian = bytes.first().is_some() && bytes.get(5).copied() == Some(ELFDATA2LSB);

    for ph in elf.program_headers.iter().filter(|ph| ph.p_type == PT_NOTE) {
        let start = ph.p_offset as usize;
        let end = start.saturating_add(ph.p_filesz as usize);
        let Some(segment) = bytes.get(start..end) else {
            continue;
        };
        if let Some(result) = parse_notes(segment, little_endian) {
            return Some(result);
        }
    }
    None
}

fn read_u32(bytes: &[u8], little_endian: bool) -> Option<u32> {
    let arr: [u8; 4] = bytes.get(0..4)?.try_into().ok()?;
    Some(if little_endian { u32::from_le_bytes(arr) } else { u32::from_be_bytes(arr) })
}

/// Walks one `PT_NOTE` segment's note records, recognizing the first FreeBSD/NetBSD/DragonFly
/// or GNU ABI-tag note it finds.
fn parse_notes(mut data: &[u8], little_endian: bool) -> Option<(Os, u32, Option<u32>)> {
    while data.len() >= 12 {
        let namesz = read_u32(data, little_endian)? as usize;
        let descsz = read_u32(&data[4..], little_endian)? as usize;
        let note_type = read_u32(&data[8..], little_endian)?;
        let mut offset = 12;

        let name_end = offset.checked_add(namesz)?;
        let name = data.get(offset..name_end)?;
        let name = std::str::from_utf8(name).unwrap_or("").trim_end_matches('\0');
        offset = align4(name_end);

        let desc_end = offset.checked_add(descsz)?;
        let desc = data.get(offset..desc_end)?;

        if let Some(result) = interpret_note(name, note_type, desc, little_endian) {
            return Some(result);
        }

        let next = align4(desc_end);
        if next <= 0 || next > data.len() {
            break;
        }
        data = &data[next..];
    }
    None
}

fn align4(n: usize) -> usize {
    n.div_ceil(4) * 4
}

/// `NT_GNU_ABI_TAG`.
const NT_GNU_ABI_TAG: u32 = 1;
/// `NT_FREEBSD_ABI_TAG` / equivalent BSD ABI-version note type.
const NT_BSD_ABI_TAG: u32 = 1;

fn interpret_note(name: &str, note_type: u32, desc: &[u8], little_endian: bool) -> Option<(Os, u32, Option<u32>)> {
    match name {
        "FreeBSD" if note_type == NT_BSD_ABI_TAG && desc.len() >= 4 => {
            let version = read_u32(desc, little_endian)?;
            Some((Os::FreeBSD, version / 100_000, None))
        }
        "NetBSD" if note_type == NT_BSD_ABI_TAG && desc.len() >= 4 => {
            let version = read_u32(desc, little_endian)?;
            Some((Os::NetBSD, version / 100_000_000, None))
        }
        "DragonFly" if note_type == NT_BSD_ABI_TAG && desc.len() >= 4 => {
            let version = read_u32(desc, little_endian)?;
            Some((Os::DragonFly, version / 100_000, Some((version / 100) % 1_000)))
        }
        "GNU" if note_type == NT_GNU_ABI_TAG && desc.len() >= 16 => {
            let os_code = read_u32(desc, little_endian)?;
            let major = read_u32(&desc[4..], little_endian)?;
            let minor = read_u32(&desc[8..], little_endian)?;
            let os = match os_code {
                0 => Os::Linux,
                3 => Os::FreeBSD,
                4 => Os::NetBSD,
                _ => return None,
            };
            Some((os, major, Some(minor)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align4_rounds_up() {
        assert_eq!(align4(0), 0);
        assert_eq!(align4(1), 4);
        assert_eq!(align4(4), 4);
        assert_eq!(align4(5), 8);
    }

    #[test]
    fn gnu_abi_tag_linux() {
        let mut desc = Vec::new();
        desc.extend_from_slice(&0u32.to_le_bytes());
        desc.extend_from_slice(&5u32.to_le_bytes());
        desc.extend_from_slice(&15u32.to_le_bytes());
        desc.extend_from_slice(&0u32.to_le_bytes());
        let result = interpret_note("GNU", NT_GNU_ABI_TAG, &desc, true);
        assert_eq!(result, Some((Os::Linux, 5, Some(15))));
    }

    #[test]
    fn freebsd_abi_tag() {
        let desc = 1_400_097u32.to_le_bytes();
        let result = interpret_note("FreeBSD", NT_BSD_ABI_TAG, &desc, true);
        assert_eq!(result, Some((Os::FreeBSD, 14, None)));
    }
}
