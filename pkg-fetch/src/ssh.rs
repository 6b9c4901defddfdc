//! The SSH transport: forks `ssh -e none -T ... [user@]host pkg ssh` and speaks the line
//! protocol over its stdin/stdout.

use std::io::Read;
use std::io::Write;
use std::process::Command;
use std::process::Stdio;

use crate::Error;
use crate::FetchItem;
use crate::FetchOutcome;
use crate::line_protocol::fetch_over_line_protocol;

/// A thin `Read + Write` adapter over an `ssh` child's stdio pipes, so
/// [`fetch_over_line_protocol`] can treat it like any other duplex stream.
struct ChildPipe {
    child: std::process::Child,
}

impl Read for ChildPipe {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.child.stdout.as_mut().expect("stdout was piped").read(buf)
    }
}

impl Write for ChildPipe {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.child.stdin.as_mut().expect("stdin was piped").write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.child.stdin.as_mut().expect("stdin was piped").flush()
    }
}

impl Drop for ChildPipe {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Fetches `item` from `host` (optionally `user@host`) over SSH, via the remote's `pkg ssh`
/// line-protocol endpoint.
///
/// # Errors
///
/// Returns [`Error::SpawnSsh`] if `ssh` cannot be started, and whatever
/// [`fetch_over_line_protocol`] reports for protocol-level failures.
pub fn fetch_ssh(host: &str, port: Option<u16>, item: &FetchItem, dest: &mut impl Write) -> Result<FetchOutcome, Error> {
    let mut command = Command::new("ssh");
    command.arg("-e").arg("none").arg("-T");
    if let Some(port) = port {
        command.arg("-p").arg(port.to_string());
    }
    command.arg(host).arg("pkg").arg("ssh");
    command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::null());

    let child = command.spawn().map_err(Error::SpawnSsh)?;
    let mut pipe = ChildPipe { child };
    let outcome = fetch_over_line_protocol(&mut pipe, item, dest, "ssh")?;
    let _ = pipe.write_all(b"quit\n");
    Ok(outcome)
}
