//! Registry Module
//!
//! Static mapping from logical table name to on-disk file name.
//!
//! ## Responsibilities
//! - Define the closed set of tables
//! - Resolve caller-supplied names (unknown names are an error)
//! - Derive table file and temp file paths
//!
//! Adding a table means adding a variant and extending `Table::ALL`;
//! there is no runtime table creation.

mod table;

pub use table::Table;

/// Suffix used for the staged copy of a table file during a write
pub const TEMP_SUFFIX: &str = ".tmp";
