//! DocumentCache implementation
//!
//! HashMap-based cache with RwLock for concurrency.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Document;
use crate::registry::Table;

/// In-memory documents, one per loaded table
#[derive(Default)]
pub struct DocumentCache {
    tables: RwLock<HashMap<Table, Arc<Document>>>,
}

impl DocumentCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached document for a table (read lock)
    pub fn get(&self, table: Table) -> Option<Arc<Document>> {
        self.tables.read().get(&table).cloned()
    }

    /// Publish a new document for a table (write lock)
    pub fn insert(&self, table: Table, document: Arc<Document>) {
        self.tables.write().insert(table, document);
    }

    /// Publish a freshly loaded document unless one is already cached
    ///
    /// Returns the document that ends up cached. A load that raced with a
    /// commit must not replace the committed document with older disk content.
    pub fn insert_if_absent(&self, table: Table, document: Arc<Document>) -> Arc<Document> {
        Arc::clone(self.tables.write().entry(table).or_insert(document))
    }

    /// Loaded tables in registry order
    pub fn tables(&self) -> Vec<Table> {
        let mut tables: Vec<Table> = self.tables.read().keys().copied().collect();
        tables.sort();
        tables
    }
}
