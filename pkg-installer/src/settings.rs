//! Transaction-wide configuration.

use std::path::PathBuf;

use glob::Pattern as GlobPattern;
use regex::Regex;

/// Configuration shared by every install/upgrade transaction.
#[derive(Clone, Debug)]
pub struct InstallSettings {
    /// The filesystem root every package path is resolved under.
    pub root: PathBuf,
    /// `FILES_IGNORE_GLOB` patterns: archive entries matching any of these are skipped entirely.
    pub ignore_globs: Vec<GlobPattern>,
    /// `FILES_IGNORE_REGEX` patterns: archive entries matching any of these are skipped
    /// entirely.
    pub ignore_regexes: Vec<Regex>,
    /// Install even if a package of the same name is already registered.
    pub force: bool,
    /// Whether an upgrade fully removes the old package before installing the new one
    /// (`true`), or installs the new one first and cleans up afterward (`false`, the default).
    pub split_upgrade: bool,
    /// Whether a shared library about to be removed during upgrade cleanup is first copied to
    /// `backup_library_path`.
    pub backup_libraries: bool,
    /// Destination directory for `backup_libraries` copies.
    pub backup_library_path: PathBuf,
    /// Optional external 3-way merge tool command line (`MERGETOOL`, `%b %l %r %o` format).
    pub mergetool: Option<String>,
    /// Optional metalog output path.
    pub metalog_path: Option<PathBuf>,
    /// Developer mode: a name/version conflict that would otherwise be skipped with a warning
    /// is instead fatal.
    pub developer_mode: bool,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            ignore_globs: Vec::new(),
            ignore_regexes: Vec::new(),
            force: false,
            split_upgrade: false,
            backup_libraries: false,
            backup_library_path: PathBuf::from("/var/backups/pkgcore"),
            mergetool: None,
            metalog_path: None,
            developer_mode: false,
        }
    }
}

impl InstallSettings {
    /// Returns whether `entry_path` (archive-relative, no leading `/`) should be skipped by the
    /// extraction pass.
    pub fn is_ignored(&self, entry_path: &str) -> bool {
        self.ignore_globs.iter().any(|pattern| pattern.matches(entry_path))
            || self.ignore_regexes.iter().any(|pattern| pattern.is_match(entry_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_ignore_matches() {
        let mut settings = InstallSettings::default();
        settings.ignore_globs.push(GlobPattern::new("*.orig").unwrap());
        assert!(settings.is_ignored("etc/foo.conf.orig"));
        assert!(!settings.is_ignored("etc/foo.conf"));
    }

    #[test]
    fn regex_ignore_matches() {
        let mut settings = InstallSettings::default();
        settings.ignore_regexes.push(Regex::new(r"\.sample$").unwrap());
        assert!(settings.is_ignored("etc/foo.conf.sample"));
        assert!(!settings.is_ignored("etc/foo.conf"));
    }
}
