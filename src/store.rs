//! Store Module
//!
//! The record store that coordinates all components.
//!
//! ## Responsibilities
//! - Create and load every registered table on startup
//! - Serve reads from the cache, loading from disk on a miss
//! - Serialize writes per table and commit them durably
//! - Take snapshots of all table files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{Document, DocumentCache};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::registry::Table;
use crate::storage::{durable, BackupManager, WriteSlot};

/// What to do when an uncached table cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Log the failure and return an empty document (not cached)
    #[default]
    Lenient,

    /// Surface the failure as `StoreError::ReadFailed`
    Strict,
}

/// The file-backed document store
///
/// ## Concurrency Model: one writer per table, any number of readers
///
/// - **Writes** (write/update): serialized per table by a `WriteSlot`
///   - Admitted in the order they were issued
///   - Must acquire: slot → temp file → rename → cache
///   - Different tables never wait on each other
///
/// - **Reads**: never take a slot
///   - Cache hit clones an `Arc` under a short read lock
///   - A reader may observe the document from just before a queued write
///
/// Construct once and share it (`Arc<Store>`) with every consumer.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Loaded documents
    cache: DocumentCache,

    /// One write slot per registered table, indexed by `Table::index`
    slots: [WriteSlot; Table::COUNT],

    /// Snapshot writer
    backups: BackupManager,
}

impl Store {
    /// Create a store without touching the filesystem
    ///
    /// Call `initialize()` before serving requests.
    pub fn new(config: Config) -> Self {
        let backups = BackupManager::new(config.data_dir.clone(), config.backup_dir());

        Self {
            config,
            cache: DocumentCache::new(),
            slots: std::array::from_fn(|_| WriteSlot::new()),
            backups,
        }
    }

    /// Create and initialize a store
    pub fn open(config: Config) -> Result<Self> {
        let store = Self::new(config);
        store.initialize()?;
        Ok(store)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Prepare every registered table
    ///
    /// Steps, per table, with its write slot held:
    /// 1. Discard a temp file left by an interrupted write
    /// 2. Create the file as `{}` if missing
    /// 3. Load it strictly and cache it
    ///
    /// Any failure here is fatal: a table that cannot be parsed must stop
    /// startup rather than be silently replaced.
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.config.data_dir)?;
        fs::create_dir_all(self.backups.backup_dir())?;

        for table in Table::ALL {
            let _guard = self.slot(table).acquire();

            let temp_path = self.temp_path(table);
            if durable::remove_stale_temp(&temp_path)? {
                tracing::warn!(
                    table = %table,
                    path = %temp_path.display(),
                    "Removed temp file from an interrupted write"
                );
            }

            let path = self.table_path(table);
            if !path.exists() {
                durable::write_atomic(&Document::new(), &path, &temp_path, self.config.sync_strategy)
                    .map_err(|source| StoreError::WriteFailed {
                        table: table.name(),
                        source,
                    })?;
                tracing::info!(table = %table, file = table.file_name(), "Created table file");
            }

            let document = durable::load_document(&path).map_err(|source| {
                tracing::error!(table = %table, error = %source, "Failed to load table");
                StoreError::CorruptTable {
                    table: table.name(),
                    source,
                }
            })?;
            self.cache.insert(table, Arc::new(document));
        }

        tracing::info!(
            data_dir = %self.config.data_dir.display(),
            tables = Table::COUNT,
            "Store initialized"
        );
        Ok(())
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Read a table by name, falling back to an empty document on load failure
    pub fn read(&self, table: &str) -> Result<Arc<Document>> {
        self.read_with(table, ReadPolicy::Lenient)
    }

    /// Read a table by name with an explicit failure policy
    pub fn read_with(&self, table: &str, policy: ReadPolicy) -> Result<Arc<Document>> {
        let table: Table = table.parse()?;
        match policy {
            ReadPolicy::Lenient => Ok(self.read_table(table)),
            ReadPolicy::Strict => self.load_strict(table),
        }
    }

    /// Read a registered table (lenient)
    pub fn read_table(&self, table: Table) -> Arc<Document> {
        match self.load_strict(table) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    table = %table,
                    error = %e,
                    "Failed to read table, falling back to empty document"
                );
                Arc::new(Document::new())
            }
        }
    }

    /// Cache hit, or load from disk and cache
    fn load_strict(&self, table: Table) -> Result<Arc<Document>> {
        if let Some(document) = self.cache.get(table) {
            return Ok(document);
        }

        let document = durable::load_document(&self.table_path(table)).map_err(|source| {
            StoreError::ReadFailed {
                table: table.name(),
                source,
            }
        })?;

        Ok(self.cache.insert_if_absent(table, Arc::new(document)))
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Replace a table's document by name
    pub fn write(&self, table: &str, document: Document) -> Result<()> {
        let table: Table = table.parse()?;
        self.write_table(table, document)
    }

    /// Replace a registered table's document
    ///
    /// Blocks behind any earlier write to the same table.
    pub fn write_table(&self, table: Table, document: Document) -> Result<()> {
        let _guard = self.slot(table).acquire();
        self.commit(table, document)
    }

    /// Atomic read-modify-write of one table
    ///
    /// `f` runs on a copy of the latest document while the table's write slot
    /// is held, so no other write can slip in between the read and the
    /// commit. If the commit fails, the cached document is left unchanged.
    ///
    /// The starting document is read strictly: an unreadable table file fails
    /// with `ReadFailed` instead of being overwritten. A missing file counts
    /// as an empty table.
    pub fn update<R>(&self, table: Table, f: impl FnOnce(&mut Document) -> R) -> Result<R> {
        let _guard = self.slot(table).acquire();

        let current = match self.load_strict(table) {
            Ok(document) => document,
            Err(StoreError::ReadFailed { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Arc::new(Document::new())
            }
            Err(e) => {
                tracing::error!(table = %table, error = %e, "Refusing to update unreadable table");
                return Err(e);
            }
        };
        let mut document = Document::clone(&current);
        let output = f(&mut document);

        self.commit(table, document)?;
        Ok(output)
    }

    /// Durably write and publish (called with the table's slot held)
    fn commit(&self, table: Table, document: Document) -> Result<()> {
        let path = self.table_path(table);
        let temp_path = self.temp_path(table);

        if let Err(source) =
            durable::write_atomic(&document, &path, &temp_path, self.config.sync_strategy)
        {
            tracing::error!(table = %table, error = %source, "Failed to write table");
            return Err(StoreError::WriteFailed {
                table: table.name(),
                source,
            });
        }

        let entries = document.len();
        self.cache.insert(table, Arc::new(document));

        tracing::debug!(table = %table, entries, "Table written");
        Ok(())
    }

    // =========================================================================
    // Backups
    // =========================================================================

    /// Snapshot every table file into a new timestamped directory
    pub fn backup(&self) -> Result<PathBuf> {
        self.backups.snapshot(&Table::ALL).map_err(|e| {
            tracing::error!(error = %e, "Failed to create backup");
            e
        })
    }

    // =========================================================================
    // Accessors (for health checks, testing and debugging)
    // =========================================================================

    /// Number of keys in a table
    pub fn entry_count(&self, table: Table) -> usize {
        self.read_table(table).len()
    }

    /// Tables currently held in the cache
    pub fn cached_tables(&self) -> Vec<Table> {
        self.cache.tables()
    }

    /// Writes holding or queued for a table's slot
    pub fn pending_writes(&self, table: Table) -> u64 {
        self.slot(table).pending()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the snapshot root
    pub fn backup_dir(&self) -> &Path {
        self.backups.backup_dir()
    }

    /// Path of a table's file
    pub fn table_path(&self, table: Table) -> PathBuf {
        table.path_in(&self.config.data_dir)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn slot(&self, table: Table) -> &WriteSlot {
        &self.slots[table.index()]
    }

    fn temp_path(&self, table: Table) -> PathBuf {
        table.temp_path_in(&self.config.data_dir)
    }
}
