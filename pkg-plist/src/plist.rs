//! The parsed, expanded form of a packing list.

use indexmap::IndexMap;
use pkg_types::ConfigFile;
use pkg_types::ConfigMergeStatus;
use pkg_types::Message;
use pkg_types::Package;
use pkg_types::PackageDirectory;
use pkg_types::PackageFile;

use crate::Error;

/// A single file or directory entry produced while expanding a packing list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlistEntry {
    /// A plain or config file, at the path it will occupy once installed.
    File {
        /// Absolute installed path.
        path: String,
        /// Owning user name.
        uname: String,
        /// Owning group name.
        gname: String,
        /// Permission bits.
        mode: u32,
        /// Whether this entry is a config file (3-way merged on upgrade).
        config: bool,
    },
    /// A directory entry.
    Dir {
        /// Absolute installed path.
        path: String,
        /// Owning user name.
        uname: String,
        /// Owning group name.
        gname: String,
        /// Permission bits.
        mode: u32,
    },
}

impl PlistEntry {
    /// The path this entry occupies once installed.
    pub fn path(&self) -> &str {
        match self {
            PlistEntry::File { path, .. } | PlistEntry::Dir { path, .. } => path,
        }
    }
}

/// The fully expanded result of parsing a packing list: the ordered file/directory entries, plus
/// the scripts and messages contributed by keyword invocations along the way.
#[derive(Clone, Debug, Default)]
pub struct Plist {
    /// Ordered file and directory entries, in the order they were declared.
    pub entries: Vec<PlistEntry>,
    /// Script fragments contributed by keyword invocations, keyed by hook name (`pre-install`,
    /// `post-install`, `pre-deinstall`, `post-deinstall`, or the `-lua` variants). Multiple
    /// contributions to the same hook are concatenated in declaration order.
    pub scripts: IndexMap<String, String>,
    /// Messages attached by keyword invocations, in declaration order.
    pub messages: Vec<Message>,
}

impl Plist {
    /// Appends a script fragment under `hook`, concatenating with any prior contribution.
    pub fn push_script(&mut self, hook: &str, fragment: &str) {
        self.scripts
            .entry(hook.to_string())
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(fragment);
            })
            .or_insert_with(|| fragment.to_string());
    }

    /// Applies every entry to `package`, creating `File`/`Dir`/`ConfigFile` records with a null
    /// checksum marker (the installer fills in the real digest once content is known).
    ///
    /// # Errors
    ///
    /// Returns an error if any path is duplicated.
    pub fn apply_to(&self, package: &mut Package) -> Result<(), Error> {
        for entry in &self.entries {
            match entry {
                PlistEntry::Dir { path, uname, gname, mode } => {
                    package.add_directory(PackageDirectory {
                        path: path.clone(),
                        uname: uname.clone(),
                        gname: gname.clone(),
                        mode: *mode,
                        flags: 0,
                        atime: None,
                        mtime: None,
                        noattrs: false,
                    })?;
                }
                PlistEntry::File { path, uname, gname, mode, config } => {
                    let file = PackageFile {
                        path: path.clone(),
                        sha256: None,
                        uname: uname.clone(),
                        gname: gname.clone(),
                        mode: *mode,
                        flags: 0,
                    };
                    package.add_file(file.clone())?;
                    if *config {
                        package.add_config_file(ConfigFile {
                            file,
                            content: None,
                            merge_status: ConfigMergeStatus::NotLocal,
                        })?;
                    }
                }
            }
        }
        for message in &self.messages {
            package.messages.push(message.clone());
        }
        Ok(())
    }
}
