//! Filesystem helpers shared by the store and the CLI.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Expand a leading `~` to the user's home directory.
///
/// Only `~` on its own or followed by a separator is expanded; `~user` forms
/// and paths without a tilde are returned unchanged. If the home directory
/// cannot be determined the path is returned as-is.
pub fn expand_tilde(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Make sure `path` exists as a file, creating parent directories as needed.
///
/// Existing files are left untouched.
pub fn create_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn expands_bare_tilde_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/app/config.ini"), home.join("app/config.ini"));
    }

    #[test]
    fn leaves_other_paths_alone() {
        assert_eq!(expand_tilde("/etc/app.ini"), PathBuf::from("/etc/app.ini"));
        assert_eq!(expand_tilde("relative.ini"), PathBuf::from("relative.ini"));
        assert_eq!(expand_tilde("~other/x.ini"), PathBuf::from("~other/x.ini"));
        assert_eq!(expand_tilde("dir/~/x.ini"), PathBuf::from("dir/~/x.ini"));
    }

    #[test]
    fn create_file_makes_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("config.ini");

        create_file(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn create_file_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        fs::write(&path, "[a]\nk = v\n").unwrap();

        create_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[a]\nk = v\n");
    }
}
