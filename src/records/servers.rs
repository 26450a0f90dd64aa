//! Server records

use serde::Serialize;
use serde_json::Value;

use super::{stamped, LAST_UPDATE};
use crate::error::Result;
use crate::registry::Table;
use crate::store::Store;

impl Store {
    /// Record for a server, if any
    pub fn get_server(&self, server_id: &str) -> Option<Value> {
        self.read_table(Table::Servers).get(server_id).cloned()
    }

    /// Store `data` as the server's record, stamped with `lastUpdate`
    pub fn set_server<T: Serialize + ?Sized>(&self, server_id: &str, data: &T) -> Result<()> {
        let record = stamped(data, LAST_UPDATE)?;

        self.update(Table::Servers, |servers| {
            servers.insert(server_id.to_string(), record);
        })
    }
}
