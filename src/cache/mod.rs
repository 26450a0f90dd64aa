//! Cache Module
//!
//! In-memory copy of every loaded table document.
//!
//! ## Responsibilities
//! - Serve reads without touching disk once a table is loaded
//! - Hand out shared snapshots (`Arc<Document>`) so readers never block writers
//! - Swap in a table's new document after a successful commit
//!
//! ## Data Structure Choice
//! HashMap wrapped in RwLock:
//! - The lock is held only long enough to clone or replace an `Arc`
//! - Documents themselves are immutable once published; a write builds a new
//!   document and replaces the entry

mod document_cache;

pub use document_cache::DocumentCache;

/// Full content of a table: string keys to arbitrary JSON values
pub type Document = serde_json::Map<String, serde_json::Value>;
