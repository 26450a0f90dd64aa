//! Durable Writer
//!
//! Temp-file-then-rename commits and strict document loading.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cache::Document;
use crate::config::SyncStrategy;

/// Load a table file, which must hold a JSON object
///
/// JSON errors surface as `io::ErrorKind::InvalidData`.
pub fn load_document(path: &Path) -> io::Result<Document> {
    let file = File::open(path)?;
    let document = serde_json::from_reader(BufReader::new(file))?;
    Ok(document)
}

/// Write `document` to `temp_path`, then rename it onto `target_path`
pub fn write_atomic(
    document: &Document,
    target_path: &Path,
    temp_path: &Path,
    sync: SyncStrategy,
) -> io::Result<()> {
    StagedFile::stage(document, target_path, temp_path, sync)?.commit()
}

/// Remove a temp file left behind by an interrupted write
///
/// Returns whether a file was removed.
pub fn remove_stale_temp(temp_path: &Path) -> io::Result<bool> {
    match fs::remove_file(temp_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// A fully written temp file that has not yet replaced its target
///
/// Dropping a `StagedFile` without committing leaves the temp file on disk
/// and the target untouched, which is exactly the state a crash between the
/// two steps produces.
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    target_path: PathBuf,
    sync: SyncStrategy,
}

impl StagedFile {
    /// Serialize `document` (pretty-printed, trailing newline) into `temp_path`
    pub fn stage(
        document: &Document,
        target_path: &Path,
        temp_path: &Path,
        sync: SyncStrategy,
    ) -> io::Result<Self> {
        if let Err(e) = Self::write_temp(document, temp_path, sync) {
            // Best effort: a half-written temp must not linger
            let _ = fs::remove_file(temp_path);
            return Err(e);
        }

        Ok(Self {
            temp_path: temp_path.to_path_buf(),
            target_path: target_path.to_path_buf(),
            sync,
        })
    }

    fn write_temp(document: &Document, temp_path: &Path, sync: SyncStrategy) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(temp_path)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        if sync == SyncStrategy::EveryWrite {
            writer.get_ref().sync_all()?;
        }

        Ok(())
    }

    /// Path of the staged temp file
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Atomically replace the target with the staged file
    pub fn commit(self) -> io::Result<()> {
        if let Err(e) = fs::rename(&self.temp_path, &self.target_path) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(e);
        }

        if self.sync == SyncStrategy::EveryWrite {
            // The rename already happened; a failed directory sync only
            // weakens durability, it does not undo the commit.
            if let Err(e) = sync_parent_dir(&self.target_path) {
                tracing::warn!(
                    path = %self.target_path.display(),
                    error = %e,
                    "Failed to sync directory after rename"
                );
            }
        }

        Ok(())
    }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
