//! Delete-if-exists filesystem helpers.
//!
//! Every deletion in the workspace goes through these two functions. A target
//! that vanished between the existence check and the removal (another process
//! got there first) is treated the same as a target that never existed.

use std::io;

use camino::Utf8Path;

use crate::error::RemoveError;

/// Removes a file or symlink if it exists.
///
/// Returns `Ok(true)` if something was removed and `Ok(false)` if the path was
/// absent. Directories are left alone and also report `Ok(false)`.
///
/// # Errors
///
/// Returns [`RemoveError`] if the path exists but cannot be removed.
pub fn remove_file_if_exists(path: &Utf8Path) -> Result<bool, RemoveError> {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(RemoveError::new(path, e)),
    }

    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(RemoveError::new(path, e)),
    }
}

/// Recursively removes a directory and everything under it, if it exists.
///
/// Returns `Ok(true)` if the directory was removed and `Ok(false)` if it was
/// absent or is not a directory.
///
/// # Errors
///
/// Returns [`RemoveError`] if the directory exists but cannot be removed.
pub fn remove_dir_all_if_exists(path: &Utf8Path) -> Result<bool, RemoveError> {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Ok(false),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(RemoveError::new(path, e)),
    }

    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(RemoveError::new(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("Invalid path");
        (dir, root)
    }

    #[test]
    fn test_remove_file_present() {
        let (_guard, root) = temp_root();
        let file = root.join("a.js");
        fs::write(&file, "").expect("write");

        assert!(remove_file_if_exists(&file).expect("remove"));
        assert!(!file.exists());
    }

    #[test]
    fn test_remove_file_absent_is_noop() {
        let (_guard, root) = temp_root();
        assert!(!remove_file_if_exists(&root.join("missing.js")).expect("remove"));
    }

    #[test]
    fn test_remove_file_skips_directories() {
        let (_guard, root) = temp_root();
        let dir = root.join("odd.js");
        fs::create_dir(&dir).expect("mkdir");

        assert!(!remove_file_if_exists(&dir).expect("remove"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_remove_dir_all_present() {
        let (_guard, root) = temp_root();
        let dir = root.join("sub");
        fs::create_dir_all(dir.join("deep")).expect("mkdir");
        fs::write(dir.join("deep/a.js"), "").expect("write");

        assert!(remove_dir_all_if_exists(&dir).expect("remove"));
        assert!(!dir.exists());
    }

    #[test]
    fn test_remove_dir_all_absent_is_noop() {
        let (_guard, root) = temp_root();
        assert!(!remove_dir_all_if_exists(&root.join("gone")).expect("remove"));
    }

    #[test]
    fn test_remove_dir_all_leaves_files() {
        let (_guard, root) = temp_root();
        let file = root.join("plain.txt");
        fs::write(&file, "x").expect("write");

        assert!(!remove_dir_all_if_exists(&file).expect("remove"));
        assert!(file.exists());
    }
}
