//! Backup and atomic commit of the workbook file.

use chrono::NaiveDateTime;
use log::{error, info, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::BACKUP_DIR_NAME;
use crate::errors::PersistenceError;
use crate::utils::fs_utils::{atomic_write_bytes, parent_dir_or_dot};

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// `backups/{stem}_{YYYYMMDD_HHMMSS}{.ext}` next to the workbook. A numeric
/// suffix is added when a backup with that name already exists.
pub fn backup_path_for(workbook: &Path, now: NaiveDateTime) -> PathBuf {
    let dir = parent_dir_or_dot(workbook).join(BACKUP_DIR_NAME);
    let stem = workbook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    let ext = workbook
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stamp = now.format("%Y%m%d_%H%M%S");

    let mut candidate = dir.join(format!("{}_{}{}", stem, stamp, ext));
    let mut counter = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{}_{}_{}{}", stem, stamp, counter, ext));
        counter += 1;
    }
    candidate
}

/// Copies the workbook into the backup directory and checks the copy against
/// `loaded`, the bytes the sync started from. A mismatch means the file
/// changed on disk mid-sync; the copy is removed and the backup fails.
pub fn create_backup(
    workbook: &Path,
    loaded: &[u8],
    now: NaiveDateTime,
) -> Result<PathBuf, PersistenceError> {
    let backup_path = backup_path_for(workbook, now);
    if let Some(dir) = backup_path.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create backup directory: {}", e);
            PersistenceError::backup_failed(workbook, e.to_string())
        })?;
    }

    info!(
        "Creating workbook backup from {} to {}",
        workbook.display(),
        backup_path.display()
    );
    fs::copy(workbook, &backup_path).map_err(|e| {
        error!("Failed to create workbook backup: {}", e);
        PersistenceError::backup_failed(workbook, e.to_string())
    })?;

    let copied = fs::read(&backup_path)
        .map_err(|e| PersistenceError::backup_failed(workbook, e.to_string()))?;
    if sha256_hex(&copied) != sha256_hex(loaded) {
        error!(
            "Workbook {} changed on disk during sync; discarding backup",
            workbook.display()
        );
        if let Err(e) = fs::remove_file(&backup_path) {
            warn!("Failed to remove unverified backup {}: {}", backup_path.display(), e);
        }
        return Err(PersistenceError::backup_failed(
            workbook,
            "workbook changed on disk during sync",
        ));
    }

    Ok(backup_path)
}

/// Replaces the workbook with `bytes` through a same-directory temp file.
pub fn commit_workbook(workbook: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    atomic_write_bytes(workbook, bytes).map_err(|e| {
        error!("Failed to commit workbook {}: {}", workbook.display(), e);
        PersistenceError::commit_failed(workbook, e.to_string())
    })?;
    info!("Committed workbook {} ({} bytes)", workbook.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 23)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_backup_path_layout() {
        let path = backup_path_for(Path::new("/data/assets.xlsx"), at(18, 5, 9));
        assert_eq!(
            path,
            PathBuf::from("/data/backups/assets_20260223_180509.xlsx")
        );
        let bare = backup_path_for(Path::new("assets.xlsx"), at(18, 5, 9));
        assert_eq!(bare, PathBuf::from("./backups/assets_20260223_180509.xlsx"));
    }

    #[test]
    fn test_backups_in_the_same_second_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = dir.path().join("assets.xlsx");
        fs::write(&workbook, b"v1").unwrap();

        let first = create_backup(&workbook, b"v1", at(9, 0, 0)).unwrap();
        let second = create_backup(&workbook, b"v1", at(9, 0, 0)).unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with("assets_20260223_090000_1.xlsx"));
        assert_eq!(fs::read(&first).unwrap(), b"v1");
        assert_eq!(fs::read(&second).unwrap(), b"v1");
    }

    #[test]
    fn test_backup_detects_external_modification() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = dir.path().join("assets.xlsx");
        fs::write(&workbook, b"edited by hand").unwrap();

        let err = create_backup(&workbook, b"original", at(9, 0, 0)).unwrap_err();
        assert!(matches!(err, PersistenceError::BackupFailed { .. }));
        assert_eq!(fs::read_dir(dir.path().join("backups")).unwrap().count(), 0);
    }

    #[test]
    fn test_commit_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = dir.path().join("assets.xlsx");
        fs::write(&workbook, b"old").unwrap();

        commit_workbook(&workbook, b"new").unwrap();
        assert_eq!(fs::read(&workbook).unwrap(), b"new");
    }
}
