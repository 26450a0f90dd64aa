//! Table definitions

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::StoreError;

use super::TEMP_SUFFIX;

/// A registered table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    /// Per-user plan records
    Users,
    /// Per-server records
    Servers,
    /// Plan definitions
    Plans,
    /// Activity log, keyed by millisecond timestamp
    Logs,
}

impl Table {
    /// Number of registered tables
    pub const COUNT: usize = 4;

    /// Every registered table, in initialization order (matches discriminants)
    pub const ALL: [Table; Table::COUNT] = [Table::Users, Table::Servers, Table::Plans, Table::Logs];

    /// Position in `Table::ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Logical name used by callers
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Servers => "servers",
            Table::Plans => "plans",
            Table::Logs => "logs",
        }
    }

    /// File name inside the data directory
    pub fn file_name(self) -> &'static str {
        match self {
            Table::Users => "users.json",
            Table::Servers => "servers.json",
            Table::Plans => "plans.json",
            Table::Logs => "activity_logs.json",
        }
    }

    /// Full path of the table file
    pub fn path_in(self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.file_name())
    }

    /// Full path of the staged file written before the rename
    pub fn temp_path_in(self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}{}", self.file_name(), TEMP_SUFFIX))
    }
}

impl FromStr for Table {
    type Err = StoreError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
