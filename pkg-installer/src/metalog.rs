//! Metalog output: a flat text record of every filesystem object an
//! install created, consumed by image builders that mount the target into a staging root.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::Error;

/// What kind of filesystem object a [`Entry`] records.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    /// A directory.
    Dir,
    /// A regular file.
    File,
    /// A symbolic link.
    Symlink,
}

impl EntryKind {
    fn as_str(self) -> &'static str {
        match self {
            EntryKind::Dir => "dir",
            EntryKind::File => "file",
            EntryKind::Symlink => "link",
        }
    }
}

/// A single metalog record: `<relpath> type=<t> uname=<u> gname=<g> mode=<m> [flags=<f>]
/// [link=<target>]`.
#[derive(Clone, Debug)]
pub struct Entry {
    /// The path relative to the install root.
    pub relpath: String,
    /// What kind of object this is.
    pub kind: EntryKind,
    /// Owning user name.
    pub uname: String,
    /// Owning group name.
    pub gname: String,
    /// POSIX permission bits.
    pub mode: u32,
    /// BSD file flags, zero if unset.
    pub flags: u32,
    /// The symlink target, for [`EntryKind::Symlink`] entries.
    pub link_target: Option<String>,
}

/// Appends [`Entry`] records to a configured output path. Does nothing if unconfigured, matching
/// spec's "when a metalog output path is configured" framing.
#[derive(Debug, Default)]
pub struct Metalog {
    path: Option<PathBuf>,
}

impl Metalog {
    /// Creates a metalog writer, or a no-op one if `path` is `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Appends one line for `entry`.
    pub fn record(&self, entry: &Entry) -> Result<(), Error> {
        let Some(path) = &self.path else { return Ok(()) };

        let mut line = format!(
            "{} type={} uname={} gname={} mode={:o}",
            entry.relpath,
            entry.kind.as_str(),
            entry.uname,
            entry.gname,
            entry.mode
        );
        if entry.flags != 0 {
            line.push_str(&format!(" flags={:#x}", entry.flags));
        }
        if let Some(target) = &entry.link_target {
            line.push_str(&format!(" link={target}"));
        }
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| Error::Metalog { path: path.clone(), source })?;
        file.write_all(line.as_bytes()).map_err(|source| Error::Metalog { path: path.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn writes_expected_line_format() -> TestResult {
        let dir = tempfile::tempdir()?;
        let log_path = dir.path().join("metalog");
        let metalog = Metalog::new(Some(log_path.clone()));
        metalog.record(&Entry {
            relpath: "usr/bin/zstd".to_string(),
            kind: EntryKind::File,
            uname: "root".to_string(),
            gname: "wheel".to_string(),
            mode: 0o755,
            flags: 0,
            link_target: None,
        })?;
        let content = std::fs::read_to_string(&log_path)?;
        assert_eq!(content, "usr/bin/zstd type=file uname=root gname=wheel mode=755\n");
        Ok(())
    }

    #[test]
    fn includes_link_target_for_symlinks() -> TestResult {
        let dir = tempfile::tempdir()?;
        let log_path = dir.path().join("metalog");
        let metalog = Metalog::new(Some(log_path.clone()));
        metalog.record(&Entry {
            relpath: "usr/lib/libfoo.so".to_string(),
            kind: EntryKind::Symlink,
            uname: "root".to_string(),
            gname: "wheel".to_string(),
            mode: 0o777,
            flags: 0,
            link_target: Some("libfoo.so.1".to_string()),
        })?;
        let content = std::fs::read_to_string(&log_path)?;
        assert!(content.ends_with(" link=libfoo.so.1\n"));
        Ok(())
    }

    #[test]
    fn unconfigured_metalog_is_a_no_op() {
        let metalog = Metalog::new(None);
        metalog
            .record(&Entry {
                relpath: "x".to_string(),
                kind: EntryKind::Dir,
                uname: "root".to_string(),
                gname: "wheel".to_string(),
                mode: 0o755,
                flags: 0,
                link_target: None,
            })
            .unwrap();
    }
}
