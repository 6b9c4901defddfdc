//! Error handling and the exit-code taxonomy.

use pkg_fetch::FetchOutcome;

use crate::ExitCode;

/// An error that can occur anywhere across a [`crate::Context`] operation.
///
/// This aggregates every sub-crate's error type behind one boundary, the way
/// the installer's top-level loop "coalescing errors into one of the [exit] codes ... for the
/// DB/CLI layers" rather than asking callers to match on nine different error enums.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A checksum string failed to parse or validate.
    #[error(transparent)]
    Checksum(#[from] pkg_checksum::Error),

    /// Binary-format analysis failed.
    #[error(transparent)]
    BinFmt(#[from] pkg_binfmt::Error),

    /// A manifest document failed to parse, emit, or convert.
    #[error(transparent)]
    Manifest(#[from] pkg_manifest::Error),

    /// A signature could not be produced or verified.
    #[error(transparent)]
    Signer(#[from] pkg_signer::Error),

    /// A fetch transport failed.
    #[error(transparent)]
    Fetch(#[from] pkg_fetch::Error),

    /// A repository operation failed.
    #[error(transparent)]
    Repo(#[from] pkg_repo::Error),

    /// A lifecycle hook script failed.
    #[error(transparent)]
    Script(#[from] pkg_script::Error),

    /// A packing list failed to parse.
    #[error(transparent)]
    Plist(#[from] pkg_plist::Error),

    /// An archive read failed.
    #[error(transparent)]
    Archive(#[from] pkg_compress::Error),

    /// An install/upgrade transaction failed.
    #[error(transparent)]
    Installer(#[from] pkg_installer::Error),

    /// The installed-package database reported an error.
    #[error(transparent)]
    Database(#[from] pkg_db::Error),

    /// A value could not be represented as one of the core's typed domain values.
    #[error(transparent)]
    Types(#[from] pkg_types::Error),

    /// No configured repository carries the given name.
    #[error("no repository named '{name}' is configured")]
    UnknownRepo {
        /// The requested repository name.
        name: String,
    },

    /// A repository operation needs `meta.conf` but [`crate::Context::refresh_repo`] was never
    /// called for it.
    #[error("repository '{name}' has no fetched meta.conf; refresh it first")]
    MissingMeta {
        /// The repository name.
        name: String,
    },

    /// A fetch completed without a transport-level error but didn't transfer the requested item.
    #[error("fetch of {what} from '{repo}' did not succeed: {outcome:?}")]
    FetchNotOk {
        /// What was being fetched (`meta.conf`, a package archive, ...).
        what: &'static str,
        /// The repository name.
        repo: String,
        /// The outcome the fetch layer reported.
        outcome: FetchOutcome,
    },
}

impl Error {
    /// Logs this error exactly once at the point it crosses the `pkgcore` boundary. [`ExitCode::Cancel`]
    /// and [`ExitCode::UpToDate`] are expected, non-fatal outcomes and are logged at `info!`
    /// instead of `error!`.
    ///
    /// Every public [`crate::Context`] method calls this once on its own returned error, so
    /// callers should not call it again on the same error value.
    pub fn log(&self) {
        match self.exit_code() {
            ExitCode::Cancel | ExitCode::UpToDate => log::info!("{self}"),
            code => log::error!("{self} (exit code: {code})"),
        }
    }

    /// Maps this error onto the standard exit-code taxonomy. Every fatal error still gets its full [`std::fmt::Display`] text
    /// through whatever sink the caller routes `pkg_emit_error`-equivalent output to; this value
    /// is the coarse process-exit-status counterpart.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            // Cancellation: "does not log as error", triggers rollback, is reported distinctly.
            Error::Installer(pkg_installer::Error::Cancelled) => ExitCode::Cancel,

            // Conflict: package already present without force, or a locked package blocking an
            // upgrade. Locally recovered as "skip and warn" by the installer itself in the
            // non-developer-mode case; reaching here means the caller asked to treat it as fatal.
            Error::Installer(pkg_installer::Error::AlreadyInstalled { .. }) => ExitCode::Installed,

            // Conflict: a file is claimed by another already-registered package.
            Error::Installer(pkg_installer::Error::FileConflict { .. }) => ExitCode::Required,

            // Filesystem: classify by the underlying io::ErrorKind where one is available.
            Error::Installer(pkg_installer::Error::Io { source, .. })
            | Error::Installer(pkg_installer::Error::Metalog { source, .. }) => io_exit_code(source),
            Error::Installer(_) => ExitCode::Fatal,

            Error::Database(pkg_db::Error::AlreadyRegistered { .. }) => ExitCode::Installed,
            Error::Database(pkg_db::Error::Io { source, .. }) | Error::Database(pkg_db::Error::Lock { source, .. }) => {
                io_exit_code(source)
            }
            Error::Database(_) => ExitCode::Fatal,

            // Trust: signature verification failure. Never retried, fatal for the archive.
            Error::Signer(_) => ExitCode::Fatal,

            // Transient: network errors, surfaced after the fetch layer's own retries.
            Error::Fetch(_) | Error::Repo(pkg_repo::Error::Fetch(_)) => ExitCode::NoNetwork,
            Error::Repo(pkg_repo::Error::Untrusted { .. }) => ExitCode::Fatal,
            Error::Repo(_) => ExitCode::Fatal,

            Error::FetchNotOk { outcome: FetchOutcome::UpToDate, .. } => ExitCode::UpToDate,
            Error::FetchNotOk { outcome: FetchOutcome::NotFound, .. } => ExitCode::EnoEnt,
            Error::FetchNotOk { outcome: FetchOutcome::Cancel, .. } => ExitCode::Cancel,
            Error::FetchNotOk { outcome: FetchOutcome::NoNetwork, .. } => ExitCode::NoNetwork,
            Error::FetchNotOk { .. } => ExitCode::Fatal,

            // Parse: malformed manifest/archive/packing-list/checksum/binary. Fatal, doesn't
            // poison other packages.
            Error::Manifest(_) | Error::Plist(_) | Error::Checksum(_) | Error::BinFmt(_) | Error::Archive(_) => {
                ExitCode::Fatal
            }

            Error::Script(_) => ExitCode::Fatal,
            Error::Types(_) => ExitCode::Fatal,
            Error::UnknownRepo { .. } | Error::MissingMeta { .. } => ExitCode::Fatal,
        }
    }
}

fn io_exit_code(source: &std::io::Error) -> ExitCode {
    match source.kind() {
        std::io::ErrorKind::PermissionDenied => ExitCode::EnoAccess,
        std::io::ErrorKind::NotFound => ExitCode::EnoEnt,
        _ => ExitCode::Fatal,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn cancelled_installer_error_maps_to_cancel() {
        let error = Error::Installer(pkg_installer::Error::Cancelled);
        assert_eq!(error.exit_code(), ExitCode::Cancel);
    }

    #[test]
    fn already_installed_maps_to_installed() {
        let error = Error::Installer(pkg_installer::Error::AlreadyInstalled { name: "zstd".to_string() });
        assert_eq!(error.exit_code(), ExitCode::Installed);
    }

    #[test]
    fn permission_denied_io_error_maps_to_enoaccess() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = Error::Installer(pkg_installer::Error::Io { path: PathBuf::from("/usr/local/bin/x"), context: "extracting", source });
        assert_eq!(error.exit_code(), ExitCode::EnoAccess);
    }

    #[test]
    fn not_found_fetch_outcome_maps_to_enoent() {
        let error = Error::FetchNotOk { what: "meta.conf", repo: "example".to_string(), outcome: FetchOutcome::NotFound };
        assert_eq!(error.exit_code(), ExitCode::EnoEnt);
    }
}
