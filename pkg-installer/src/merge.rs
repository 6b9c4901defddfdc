//! Config-file 3-way merge.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::Command;

use pkg_types::ConfigMergeStatus;

use crate::Error;

/// The outcome of attempting to merge a config file's three versions.
#[derive(Debug)]
pub struct MergeResult {
    /// How the merge went.
    pub status: ConfigMergeStatus,
    /// The content to write: the merged result on success, the conflict-marked text on
    /// [`ConfigMergeStatus::Failed`] (destined for a `.pkgnew` sibling), or `remote` verbatim
    /// when no merge was needed.
    pub content: String,
}

/// Performs the installer's config-file 3-way merge.
///
/// `base` is the file's content as shipped by the previously-installed version of this package
/// (`None` on a fresh install, or if the old package carried no record of it). `local` is the
/// file's content on disk right now. `remote` is the file's content in the new archive.
///
/// If `mergetool` is set, it is run as a shell command with `%b`/`%l`/`%r`/`%o` substituted for
/// temp file paths holding `base`/`local`/`remote`/the merge output, matching the `MERGETOOL`
/// external-tool convention. Otherwise a built-in Myers-diff-based 3-way
/// merge (via `diffy`) is used.
pub fn merge_config(
    base: Option<&str>,
    local: &str,
    remote: &str,
    mergetool: Option<&str>,
) -> Result<MergeResult, Error> {
    let Some(base) = base else {
        return Ok(MergeResult { status: ConfigMergeStatus::NotLocal, content: remote.to_string() });
    };

    if local == base {
        return Ok(MergeResult { status: ConfigMergeStatus::NotNeeded, content: remote.to_string() });
    }

    match mergetool {
        Some(tool) => run_external_mergetool(tool, base, local, remote),
        None => Ok(match diffy::merge(base, local, remote) {
            Ok(merged) => MergeResult { status: ConfigMergeStatus::Success, content: merged },
            Err(conflicted) => MergeResult { status: ConfigMergeStatus::Failed, content: conflicted },
        }),
    }
}

fn run_external_mergetool(tool: &str, base: &str, local: &str, remote: &str) -> Result<MergeResult, Error> {
    let base_file = write_temp("base", base)?;
    let local_file = write_temp("local", local)?;
    let remote_file = write_temp("remote", remote)?;
    let output_file = tempfile::Builder::new()
        .prefix("pkgcore-mergetool-output-")
        .tempfile()
        .map_err(|source| Error::io(std::env::temp_dir(), "creating mergetool output file", source))?;

    let command_line = tool
        .replace("%b", &base_file.path().to_string_lossy())
        .replace("%l", &local_file.path().to_string_lossy())
        .replace("%r", &remote_file.path().to_string_lossy())
        .replace("%o", &output_file.path().to_string_lossy());

    let status = Command::new("/bin/sh")
        .arg("-c")
        .arg(&command_line)
        .status()
        .map_err(|source| Error::io(PathBuf::from(tool), "running configured MERGETOOL", source))?;

    let merged = std::fs::read_to_string(output_file.path())
        .map_err(|source| Error::io(output_file.path(), "reading mergetool output", source))?;

    if status.success() {
        Ok(MergeResult { status: ConfigMergeStatus::Success, content: merged })
    } else {
        Ok(MergeResult { status: ConfigMergeStatus::Failed, content: merged })
    }
}

fn write_temp(label: &str, content: &str) -> Result<tempfile::NamedTempFile, Error> {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("pkgcore-mergetool-{label}-"))
        .tempfile()
        .map_err(|source| Error::io(std::env::temp_dir(), "creating mergetool input file", source))?;
    file.write_all(content.as_bytes())
        .map_err(|source| Error::io(file.path(), "writing mergetool input file", source))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn untouched_local_accepts_remote_outright() -> TestResult {
        let result = merge_config(Some("a\nb\nc\n"), "a\nb\nc\n", "a\nb\nchanged\n", None)?;
        assert_eq!(result.status, ConfigMergeStatus::NotNeeded);
        assert_eq!(result.content, "a\nb\nchanged\n");
        Ok(())
    }

    #[test]
    fn non_overlapping_edits_merge_cleanly() -> TestResult {
        let base = "one\ntwo\nthree\n";
        let local = "one (local)\ntwo\nthree\n";
        let remote = "one\ntwo\nthree (remote)\n";
        let result = merge_config(Some(base), local, remote, None)?;
        assert_eq!(result.status, ConfigMergeStatus::Success);
        assert!(result.content.contains("one (local)"));
        assert!(result.content.contains("three (remote)"));
        Ok(())
    }

    #[test]
    fn overlapping_edits_conflict() -> TestResult {
        let base = "one\n";
        let local = "one (local)\n";
        let remote = "one (remote)\n";
        let result = merge_config(Some(base), local, remote, None)?;
        assert_eq!(result.status, ConfigMergeStatus::Failed);
        Ok(())
    }

    #[test]
    fn missing_base_is_not_local() -> TestResult {
        let result = merge_config(None, "whatever\n", "remote\n", None)?;
        assert_eq!(result.status, ConfigMergeStatus::NotLocal);
        assert_eq!(result.content, "remote\n");
        Ok(())
    }

    #[test]
    fn external_mergetool_runs_and_reads_output_file() -> TestResult {
        let result = merge_config(
            Some("one\n"),
            "one (local)\n",
            "one (remote)\n",
            Some("cp %l %o"),
        )?;
        assert_eq!(result.status, ConfigMergeStatus::Success);
        assert_eq!(result.content, "one (local)\n");
        Ok(())
    }
}
