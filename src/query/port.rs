use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::filter::{DateField, GroupKey, TaskFilter};
use crate::error::Result;
use crate::model::{User, UserId};

/// Read-only query interface over a task store.
///
/// Analytics only needs these two capabilities, so any backend that can
/// group-and-count a user's tasks can serve it.
#[async_trait]
pub trait TaskQueryPort: Send + Sync {
    /// Count the user's tasks matching `filter`, grouped by the raw stored
    /// value of `key`. Groups with no tasks are absent.
    async fn count_grouped(
        &self,
        user: UserId,
        filter: &TaskFilter,
        key: GroupKey,
    ) -> Result<HashMap<String, u64>>;

    /// Count the user's tasks matching `filter` whose `field` lies in
    /// `[start, end]`, grouped by UTC calendar day (`YYYY-MM-DD`).
    async fn count_by_date_bucket(
        &self,
        user: UserId,
        filter: &TaskFilter,
        field: DateField,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<String, u64>>;
}

/// Existence check and display name for a user reference.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>>;
}
