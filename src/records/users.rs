//! User plan records

use serde::Serialize;
use serde_json::Value;

use super::{stamped, LAST_MODIFIED};
use crate::error::Result;
use crate::registry::Table;
use crate::store::Store;

impl Store {
    /// Plan record for a user, if any
    pub fn get_user_plan(&self, user_id: &str) -> Option<Value> {
        self.read_table(Table::Users).get(user_id).cloned()
    }

    /// Store `plan` as the user's record, stamped with `lastModified`
    ///
    /// Replaces any previous record for the user. `plan` must serialize to a
    /// JSON object.
    pub fn set_user_plan<T: Serialize + ?Sized>(&self, user_id: &str, plan: &T) -> Result<()> {
        let record = stamped(plan, LAST_MODIFIED)?;

        self.update(Table::Users, |users| {
            users.insert(user_id.to_string(), record);
        })
    }

    /// Delete a user's record; returns whether one existed
    pub fn remove_user_plan(&self, user_id: &str) -> Result<bool> {
        self.update(Table::Users, |users| users.remove(user_id).is_some())
    }
}
