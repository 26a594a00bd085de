//! Downloads directory hygiene.
//!
//! The downloads directory is scratch space: every file in it is either a
//! leftover from a crashed run or an artifact already sent to the user.
//! Batches sweep it clean before starting and after finishing.

use std::path::Path;

use crate::core::config;

/// Removes every regular file in the downloads directory. Subdirectories and
/// unreadable entries are left alone. A missing directory is created instead.
pub fn cleanup_downloads_dir() -> std::io::Result<usize> {
    let dir = config::download_folder_path();
    cleanup_dir(Path::new(&dir))
}

fn cleanup_dir(dir: &Path) -> std::io::Result<usize> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_file() {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
            }
        }
    }

    if removed > 0 {
        log::info!("Cleaned {} stale file(s) from {}", removed, dir.display());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_files_keeps_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("b.part"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("keep")).unwrap();

        let removed = cleanup_dir(dir.path()).unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("keep").exists());
        assert!(!dir.path().join("a.mp4").exists());
    }

    #[test]
    fn test_cleanup_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("downloads");
        let removed = cleanup_dir(&target).unwrap();
        assert_eq!(removed, 0);
        assert!(target.is_dir());
    }
}
