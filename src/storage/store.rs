use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{repository, Database};
use crate::date_util::to_db_timestamp;
use crate::error::{Error, Result};
use crate::model::{User, UserId};
use crate::query::{DateField, GroupKey, TaskFilter, TaskQueryPort, UserLookup};

/// [`TaskQueryPort`] backed by the SQLite warehouse. All queries go through
/// the reader connection.
#[derive(Clone)]
pub struct SqliteTaskStore {
    db: Database,
}

impl SqliteTaskStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskQueryPort for SqliteTaskStore {
    async fn count_grouped(
        &self,
        user: UserId,
        filter: &TaskFilter,
        key: GroupKey,
    ) -> Result<HashMap<String, u64>> {
        let filter = filter.clone();
        let user = user.to_string();
        self.db
            .reader()
            .call(move |conn| {
                let (where_clause, params) = filter.build_sql(2);
                let column = key.column();
                let sql = format!(
                    "SELECT {column}, COUNT(*) FROM tasks t
                     WHERE t.user_id = ?1{where_clause}
                     GROUP BY {column}"
                );
                let mut stmt = conn.prepare(&sql)?;
                stmt.raw_bind_parameter(1, &user)?;
                for (i, p) in params.iter().enumerate() {
                    stmt.raw_bind_parameter(i + 2, p)?;
                }

                let mut groups = HashMap::new();
                let mut rows = stmt.raw_query();
                while let Some(row) = rows.next()? {
                    let value: String = row.get(0)?;
                    let count: i64 = row.get(1)?;
                    groups.insert(value, count as u64);
                }
                Ok::<_, rusqlite::Error>(groups)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn count_by_date_bucket(
        &self,
        user: UserId,
        filter: &TaskFilter,
        field: DateField,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<String, u64>> {
        let filter = filter.clone();
        let user = user.to_string();
        let start = to_db_timestamp(&start);
        let end = to_db_timestamp(&end);
        self.db
            .reader()
            .call(move |conn| {
                let (where_clause, params) = filter.build_sql(4);
                let column = field.column();
                // Stored timestamps are fixed-width UTC, so the first ten
                // characters are the calendar day.
                let sql = format!(
                    "SELECT substr({column}, 1, 10) AS day, COUNT(*) FROM tasks t
                     WHERE t.user_id = ?1 AND {column} >= ?2 AND {column} <= ?3{where_clause}
                     GROUP BY day
                     ORDER BY day"
                );
                let mut stmt = conn.prepare(&sql)?;
                stmt.raw_bind_parameter(1, &user)?;
                stmt.raw_bind_parameter(2, &start)?;
                stmt.raw_bind_parameter(3, &end)?;
                for (i, p) in params.iter().enumerate() {
                    stmt.raw_bind_parameter(i + 4, p)?;
                }

                let mut buckets = BTreeMap::new();
                let mut rows = stmt.raw_query();
                while let Some(row) = rows.next()? {
                    let day: String = row.get(0)?;
                    let count: i64 = row.get(1)?;
                    buckets.insert(day, count as u64);
                }
                Ok::<_, rusqlite::Error>(buckets)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}

#[async_trait]
impl UserLookup for SqliteTaskStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        self.db
            .reader()
            .call(move |conn| repository::get_user(conn, &id))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
