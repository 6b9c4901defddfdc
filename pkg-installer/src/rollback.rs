//! Rollback bookkeeping: a LIFO list of reserved paths, removed in
//! reverse order on any fatal error before `Commit`.

use std::path::Path;
use std::path::PathBuf;

use log::warn;

/// Tracks temp paths (and other artifacts reserved during extraction) so they can be unwound if
/// the transaction fails before `Commit`.
#[derive(Debug, Default)]
pub struct RollbackStack {
    paths: Vec<PathBuf>,
}

impl RollbackStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a path that must be removed if the transaction is rolled back.
    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Removes every recorded path in LIFO order, best-effort ("rollback callbacks are
    /// best-effort (errors inside rollback are logged but not re-raised)").
    pub fn unwind(&mut self) {
        while let Some(path) = self.paths.pop() {
            remove(&path);
        }
    }
}

fn remove(path: &Path) {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return,
        Err(source) => {
            warn!("rollback: failed to stat {path:?}: {source}");
            return;
        }
    };
    let result =
        if metadata.is_dir() { std::fs::remove_dir_all(path) } else { std::fs::remove_file(path) };
    if let Err(source) = result {
        warn!("rollback: failed to remove {path:?}: {source}");
    }
}
