//! Hidden temp-path naming.

use std::path::Path;
use std::path::PathBuf;

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Returns a hidden sibling path `<dir>/.pkgtemp.<name>.<random>` for the eventual target
/// `<dir>/<name>`.
///
/// Extraction always writes here first; the final rename pass (bottom-up, directories before
/// the files they contain) is what makes the target path visible. A mid-install failure leaves
/// only these hidden-prefixed paths behind, which a sweep can safely remove.
pub fn hidden_temp_path(parent: &Path, name: &str) -> PathBuf {
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(12).map(char::from).collect();
    parent.join(format!(".pkgtemp.{name}.{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_hidden_and_distinct() {
        let parent = Path::new("/var/pkg/root/usr/bin");
        let a = hidden_temp_path(parent, "zstd");
        let b = hidden_temp_path(parent, "zstd");
        assert_ne!(a, b);
        assert!(a.file_name().unwrap().to_str().unwrap().starts_with(".pkgtemp.zstd."));
    }
}
