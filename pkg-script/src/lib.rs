#![doc = include_str!("../README.md")]

//! Lifecycle hook invocation for package pre/post install/deinstall scripts: shell
//! scripts run as forked children, Lua scripts run against a sandboxed `mlua` VM. Both share the
//! same `msgfd` message-pipe convention so an installer can present script-emitted messages to
//! the user without caring which language produced them.

mod error;
mod hook;
mod lua;
mod rooted_path;
mod shell;

use std::path::Path;
use std::sync::mpsc::Sender;

pub use error::Error;
pub use hook::Hook;
pub use rooted_path::RootedPath;

/// A single lifecycle script, in whichever language the package declared it.
#[derive(Clone, Debug)]
pub enum Script {
    /// A POSIX shell script body, run via `/bin/sh -s`.
    Shell(String),
    /// A Lua script body, run against a sandboxed `mlua` VM.
    Lua(String),
}

impl Script {
    /// Runs this script for lifecycle point `hook`, rooted at `root`.
    ///
    /// User-visible messages the script emits (via `MSG:`-prefixed stdout lines for shell
    /// scripts, or `pkg.print_msg`/`msgfd.send` for Lua scripts) are forwarded to `messages`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScriptExecutionError`] if a shell script exits non-zero, or
    /// [`Error::Lua`] if a Lua script fails to compile or run.
    pub fn run(&self, hook: Hook, root: &Path, messages: &Sender<String>) -> Result<(), Error> {
        match self {
            Script::Shell(body) => shell::run_shell_hook(body, hook, root, messages),
            Script::Lua(body) => lua::run_lua_hook(body, hook, &RootedPath::new(root), messages.clone()),
        }
    }
}
