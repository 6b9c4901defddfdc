//! Shell hook invocation: fork a child with piped stdio, dispatching any of the four
//! lifecycle hooks through the same subprocess path.

use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::process::Stdio;
use std::sync::mpsc::Sender;

use log::debug;

use crate::Error;
use crate::Hook;

/// The line prefix a shell hook uses to emit a user-visible message instead of plain log
/// chatter, standing in for the inherited `msgfd` write descriptor the original process model
/// hands the child.
const MESSAGE_PREFIX: &str = "MSG:";

/// Runs `script` (a `#!/bin/sh` body, or any script with its own shebang) as a child process
/// rooted at `root`, for lifecycle point `hook`.
///
/// Lines of stdout prefixed with `MSG:` are forwarded to `messages` as user-visible install
/// messages; all other output is logged at `debug!`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the shell cannot be spawned, or
/// [`Error::ScriptExecutionError`] if it exits with a non-zero status.
pub fn run_shell_hook(
    script: &str,
    hook: Hook,
    root: &Path,
    messages: &Sender<String>,
) -> Result<(), Error> {
    let mut command = Command::new("/bin/sh");
    command
        .arg("-s")
        .current_dir(root)
        .env("PKG_HOOK", hook.to_string())
        .env("PKG_ROOT", root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning {hook} shell hook in {}", root.display());
    let mut child = command.spawn().map_err(|source| Error::Io { context: "spawning shell hook", source })?;

    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(script.as_bytes())
        .map_err(|source| Error::Io { context: "writing shell hook body", source })?;

    let output = child
        .wait_with_output()
        .map_err(|source| Error::Io { context: "waiting for shell hook", source })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(message) = line.strip_prefix(MESSAGE_PREFIX) {
            let _ = messages.send(message.trim().to_string());
        } else {
            debug!("{hook}: {line}");
        }
    }

    if !output.status.success() {
        return Err(Error::ScriptExecutionError {
            status: output.status.to_string(),
            stdout: stdout.into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn runs_script_and_reports_success() -> TestResult {
        let dir = tempfile::tempdir()?;
        let (tx, _rx) = mpsc::channel();
        run_shell_hook("echo hi\nexit 0\n", Hook::PostInstall, dir.path(), &tx)?;
        Ok(())
    }

    #[test]
    fn nonzero_exit_is_an_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let (tx, _rx) = mpsc::channel();
        let err = run_shell_hook("exit 7\n", Hook::PreDeinstall, dir.path(), &tx).unwrap_err();
        assert!(matches!(err, Error::ScriptExecutionError { .. }));
        Ok(())
    }

    #[test]
    fn forwards_prefixed_lines_as_messages() -> TestResult {
        let dir = tempfile::tempdir()?;
        let (tx, rx) = mpsc::channel();
        run_shell_hook("echo MSG:hello there\n", Hook::PostInstall, dir.path(), &tx)?;
        assert_eq!(rx.try_recv()?, "hello there");
        Ok(())
    }
}
