//! Error types for docstore
//!
//! Provides a unified error type for all store operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for docstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Registry Errors
    // -------------------------------------------------------------------------
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    // -------------------------------------------------------------------------
    // Table File Errors
    // -------------------------------------------------------------------------
    #[error("Table '{table}' is corrupt: {source}")]
    CorruptTable {
        table: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read table '{table}': {source}")]
    ReadFailed {
        table: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write table '{table}': {source}")]
    WriteFailed {
        table: &'static str,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Backup Errors
    // -------------------------------------------------------------------------
    #[error("Backup to {} failed: {source}", path.display())]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
