//! # docstore
//!
//! An embedded, file-backed JSON document store with:
//! - One pretty-printed JSON file per registered table
//! - In-memory cache serving every read after the first load
//! - Per-table write serialization in issue order
//! - Crash-safe commits (temp file + atomic rename)
//! - Point-in-time snapshots of all table files
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Consumers (Arc<Store>)                    │
//! │      command handlers · schedulers · pollers · health        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Records (domain accessors)                   │
//! │          users · servers · activity logs                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Store                                │
//! │        read · write · update · backup · initialize           │
//! └───────┬──────────────────────┬───────────────────┬──────────┘
//!         │                      │                   │
//!         ▼                      ▼                   ▼
//!  ┌─────────────┐      ┌─────────────────┐   ┌─────────────┐
//!  │    Cache    │      │  WriteSlot/table│   │   Backups   │
//!  │  (RwLock)   │      │  → durable write│   │ (snapshots) │
//!  └─────────────┘      └─────────────────┘   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod registry;
pub mod cache;
pub mod storage;
pub mod store;
pub mod records;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use cache::Document;
pub use config::{Config, SyncStrategy};
pub use error::{Result, StoreError};
pub use records::{ActivityLog, LogRecord, DEFAULT_RECENT_LOGS};
pub use registry::Table;
pub use store::{ReadPolicy, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of docstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
