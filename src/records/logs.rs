//! Activity log

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use super::{ActivityLog, LogRecord};
use crate::cache::Document;
use crate::error::{Result, StoreError};
use crate::registry::Table;
use crate::store::Store;

/// Entries returned by `get_recent_logs` when the caller has no preference
pub const DEFAULT_RECENT_LOGS: usize = 50;

/// Digits in a millisecond timestamp until the year 2286
const TIMESTAMP_DIGITS: usize = 13;

impl Store {
    /// Append an activity entry; returns its key
    ///
    /// Keys are millisecond timestamps. When the clock has not advanced past
    /// the newest existing key (same millisecond, or a clock step backwards)
    /// the key is bumped to one past it, so entries are never overwritten and
    /// key order stays insertion order.
    pub fn log_activity<T: Serialize + ?Sized>(
        &self,
        user_id: &str,
        action: &str,
        details: &T,
    ) -> Result<String> {
        let details =
            serde_json::to_value(details).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        self.update(Table::Logs, |logs| {
            // Key and timestamp come from the same clock reading, taken with
            // the slot held, so key order and timestamp order agree.
            let now = Utc::now();
            let key = next_log_key(logs, now.timestamp_millis());
            let entry = ActivityLog {
                user_id: user_id.to_string(),
                action: action.to_string(),
                details,
                timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            };
            logs.insert(key.clone(), entry.into_value());
            key
        })
    }

    /// Newest `limit` log entries, newest first
    ///
    /// Entries that are not valid `ActivityLog` objects are skipped.
    pub fn get_recent_logs(&self, limit: usize) -> Vec<LogRecord> {
        let logs = self.read_table(Table::Logs);

        let mut entries: Vec<_> = logs.iter().collect();
        entries.sort_unstable_by(|(a, _), (b, _)| b.cmp(a));

        entries
            .into_iter()
            .filter_map(|(id, value)| {
                match serde_json::from_value::<ActivityLog>(value.clone()) {
                    Ok(entry) => Some(LogRecord {
                        id: id.clone(),
                        entry,
                    }),
                    Err(e) => {
                        tracing::warn!(id = %id, error = %e, "Skipping malformed log entry");
                        None
                    }
                }
            })
            .take(limit)
            .collect()
    }
}

/// Key for a new log entry given the current time in milliseconds
fn next_log_key(logs: &Document, now_millis: i64) -> String {
    let now = u64::try_from(now_millis).unwrap_or(0);
    // Only keys shaped like timestamps count; arbitrary numeric keys written
    // through `write` must not push new keys out of timestamp range.
    let newest = logs
        .keys()
        .filter(|key| key.len() <= TIMESTAMP_DIGITS && key.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|key| key.parse::<u64>().ok())
        .max();

    let millis = match newest {
        Some(newest) if newest >= now => newest + 1,
        _ => now,
    };
    millis.to_string()
}
