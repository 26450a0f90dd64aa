//! Configuration for docstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a docstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the table files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── users.json
    ///     ├── servers.json
    ///     ├── plans.json
    ///     ├── activity_logs.json
    ///     └── backups/         (default snapshot root)
    pub data_dir: PathBuf,

    /// Snapshot root; `None` means `{data_dir}/backups`
    pub backup_dir: Option<PathBuf>,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Whether commits fsync before and after the rename
    pub sync_strategy: SyncStrategy,
}

/// Sync strategy for committed table files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync the temp file and the directory on every write (safest, slowest)
    EveryWrite,

    /// Leave flushing to the OS. The rename is still atomic, but a power loss
    /// may roll a table back to an earlier committed version.
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            backup_dir: None,
            sync_strategy: SyncStrategy::EveryWrite,
        }
    }
}

impl Config {
    /// Directory name for snapshots when no backup dir is configured
    pub const DEFAULT_BACKUP_SUBDIR: &'static str = "backups";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolved snapshot root
    pub fn backup_dir(&self) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(Self::DEFAULT_BACKUP_SUBDIR))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all table files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set an explicit snapshot root
    pub fn backup_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.backup_dir = Some(path.into());
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
