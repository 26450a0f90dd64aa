//! Backup Manager
//!
//! Copies every table file into a timestamp-named snapshot directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{Result, StoreError};
use crate::registry::Table;

/// Creates point-in-time snapshots of the table files
///
/// Snapshots bypass the write slots: each copied file is a complete committed
/// version (renames are atomic), but tables may come from different moments
/// if writes land while the snapshot runs.
pub struct BackupManager {
    /// Directory holding the live table files
    data_dir: PathBuf,

    /// Root under which snapshot directories are created
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(data_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Snapshot root
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copy the files of `tables` into a new snapshot directory
    ///
    /// Tables whose file does not exist yet are skipped. A failed snapshot
    /// leaves whatever it already copied in place.
    pub fn snapshot(&self, tables: &[Table]) -> Result<PathBuf> {
        let snapshot_dir = self.backup_dir.join(snapshot_name(Utc::now()));

        fs::create_dir_all(&snapshot_dir).map_err(|source| StoreError::BackupFailed {
            path: snapshot_dir.clone(),
            source,
        })?;

        let mut copied = 0usize;
        for table in tables {
            let source_path = table.path_in(&self.data_dir);
            if !source_path.exists() {
                tracing::debug!(table = %table, "Skipping missing table file in backup");
                continue;
            }

            let backup_path = snapshot_dir.join(table.file_name());
            fs::copy(&source_path, &backup_path).map_err(|source| StoreError::BackupFailed {
                path: backup_path.clone(),
                source,
            })?;
            copied += 1;
        }

        tracing::info!(
            path = %snapshot_dir.display(),
            files = copied,
            "Backup created"
        );

        Ok(snapshot_dir)
    }
}

/// Directory name for a snapshot taken at `at`
///
/// RFC 3339 with millisecond precision, `:` and `.` replaced by `-` so the
/// name is valid on every filesystem: `2026-10-17T09-30-00-123Z`.
pub fn snapshot_name(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}
