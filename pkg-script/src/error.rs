//! Error handling.

use std::path::PathBuf;

use thiserror::Error;

/// The high-level error that can occur when running a lifecycle hook script.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while spawning or waiting on a shell hook.
    #[error("I/O error while {context}:\n{source}")]
    Io {
        /// The context in which the error occurred. Completes "I/O error while ...".
        context: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A path escaped the package's root during a sandboxed Lua `*at` operation.
    #[error("path {path:?} escapes the sandboxed root {root:?}")]
    PathEscape {
        /// The path the script attempted to access.
        path: PathBuf,
        /// The root the script is confined to.
        root: PathBuf,
    },

    /// A shell hook exited with a non-zero status.
    #[error("hook script exited with {status}:\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    ScriptExecutionError {
        /// The process exit status, rendered for display.
        status: String,
        /// Captured stdout.
        stdout: String,
        /// Captured stderr.
        stderr: String,
    },

    /// The embedded Lua interpreter reported an error.
    #[error(transparent)]
    Lua(#[from] mlua::Error),

    /// A `pkg-types` operation failed while applying script side effects.
    #[error(transparent)]
    Package(#[from] pkg_types::Error),
}
