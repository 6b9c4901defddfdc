//! The standard exit-code enum used throughout the core.

/// A coarse outcome code, shared by every CLI/DB-facing caller rather than each one matching on
/// the full [`crate::Error`] taxonomy.
///
/// `Ok`/`End`/`Warn` are pinned at `0`/`1`/`2` (`Ok` must be `0` to double as a process exit
/// status on success); the remainder are assigned in declaration order. Callers that need a
/// different wire-compatible numbering should map through [`ExitCode::as_i32`] rather than
/// relying on that order being stable across versions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[repr(i32)]
pub enum ExitCode {
    /// The operation completed successfully.
    Ok = 0,
    /// The operation completed; no more input is expected (end of an iteration, not an error).
    End = 1,
    /// The operation completed with a warning the caller should surface but not treat as fatal.
    Warn = 2,
    /// An unrecoverable error occurred.
    Fatal,
    /// A required dependency or capability is missing.
    Required,
    /// The package (or an identical version/checksum of it) is already installed.
    Installed,
    /// The package, or a file it needs to touch, is locked against modification.
    Locked,
    /// A filesystem operation failed with a permission error.
    EnoAccess,
    /// A filesystem operation failed because the path did not exist.
    EnoEnt,
    /// The requested 32-bit compatibility package set is unavailable on this host.
    EnoCompat32,
    /// The operation was cancelled via its cooperative cancellation flag.
    Cancel,
    /// The requested content was already current; nothing needed fetching.
    UpToDate,
    /// No network path to the remote repository could be established.
    NoNetwork,
}

impl ExitCode {
    /// Returns the numeric value of this code, suitable for use as a process exit status.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_zero() {
        assert_eq!(ExitCode::Ok.as_i32(), 0);
    }

    #[test]
    fn end_and_warn_follow_ok() {
        assert_eq!(ExitCode::End.as_i32(), 1);
        assert_eq!(ExitCode::Warn.as_i32(), 2);
    }

    #[test]
    fn display_is_kebab_case() {
        assert_eq!(ExitCode::NoNetwork.to_string(), "no-network");
        assert_eq!(ExitCode::EnoAccess.to_string(), "eno-access");
    }
}
