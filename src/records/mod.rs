//! Records Module
//!
//! Named domain operations over the store's tables.
//!
//! ## Tables Used
//! - `users`: plan record per user id, stamped with `lastModified`
//! - `servers`: record per server id, stamped with `lastUpdate`
//! - `logs`: activity entries keyed by millisecond timestamp
//!
//! Every mutating operation is one `Store::update` call, so concurrent
//! accessors on the same table cannot lose each other's changes.

mod logs;
mod servers;
mod users;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, StoreError};

pub use logs::DEFAULT_RECENT_LOGS;

/// Field stamped onto user records on every write
pub const LAST_MODIFIED: &str = "lastModified";

/// Field stamped onto server records on every write
pub const LAST_UPDATE: &str = "lastUpdate";

/// A single activity log entry as stored in the `logs` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    /// Who performed the action
    pub user_id: String,

    /// Action name
    pub action: String,

    /// Free-form payload
    #[serde(default)]
    pub details: Value,

    /// When the entry was written (RFC 3339, millisecond precision)
    pub timestamp: String,
}

impl ActivityLog {
    /// Stored form of the entry, matching its serde representation
    pub fn into_value(self) -> Value {
        json!({
            "userId": self.user_id,
            "action": self.action,
            "details": self.details,
            "timestamp": self.timestamp,
        })
    }
}

/// A log entry together with its key, as returned by `get_recent_logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,

    #[serde(flatten)]
    pub entry: ActivityLog,
}

/// Current time in the format used for record timestamps
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize caller data into a JSON object and stamp `field` with the time
fn stamped<T: Serialize + ?Sized>(data: &T, field: &str) -> Result<Value> {
    let value = serde_json::to_value(data).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

    match value {
        Value::Object(mut record) => {
            record.insert(field.to_string(), Value::String(timestamp_now()));
            Ok(Value::Object(record))
        }
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
