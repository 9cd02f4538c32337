use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::filter::{DateField, GroupKey, TaskFilter};
use super::port::{TaskQueryPort, UserLookup};
use crate::date_util::date_key;
use crate::error::{Error, Result};
use crate::model::{Task, User, UserId};

/// Task store held entirely in memory. Serves tests and callers that
/// already have their tasks loaded.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    users: RwLock<HashMap<UserId, User>>,
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) -> Result<()> {
        self.users
            .write()
            .map_err(|e| Error::Other(e.to_string()))?
            .insert(user.id, user);
        Ok(())
    }

    pub fn add_task(&self, task: Task) -> Result<()> {
        self.tasks
            .write()
            .map_err(|e| Error::Other(e.to_string()))?
            .push(task);
        Ok(())
    }

    pub fn extend_tasks(&self, tasks: impl IntoIterator<Item = Task>) -> Result<()> {
        self.tasks
            .write()
            .map_err(|e| Error::Other(e.to_string()))?
            .extend(tasks);
        Ok(())
    }

    pub fn task_count(&self) -> Result<usize> {
        Ok(self
            .tasks
            .read()
            .map_err(|e| Error::Other(e.to_string()))?
            .len())
    }
}

#[async_trait]
impl TaskQueryPort for InMemoryTaskStore {
    async fn count_grouped(
        &self,
        user: UserId,
        filter: &TaskFilter,
        key: GroupKey,
    ) -> Result<HashMap<String, u64>> {
        let tasks = self.tasks.read().map_err(|e| Error::Other(e.to_string()))?;
        let mut groups: HashMap<String, u64> = HashMap::new();
        for task in tasks.iter().filter(|t| t.user == user && filter.matches(t)) {
            *groups.entry(key.value_of(task).to_string()).or_default() += 1;
        }
        Ok(groups)
    }

    async fn count_by_date_bucket(
        &self,
        user: UserId,
        filter: &TaskFilter,
        field: DateField,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<String, u64>> {
        let tasks = self.tasks.read().map_err(|e| Error::Other(e.to_string()))?;
        let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
        for task in tasks.iter().filter(|t| t.user == user && filter.matches(t)) {
            let ts = field.value_of(task);
            if ts >= start && ts <= end {
                *buckets.entry(date_key(&ts)).or_default() += 1;
            }
        }
        Ok(buckets)
    }
}

#[async_trait]
impl UserLookup for InMemoryTaskStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().map_err(|e| Error::Other(e.to_string()))?;
        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaskPriority, TaskStatus};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_count_grouped_scopes_to_user() {
        let store = InMemoryTaskStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        store
            .extend_tasks([
                Task::new(alice, "a1", at(1, 9)).with_priority(TaskPriority::High),
                Task::new(alice, "a2", at(1, 9)).with_priority(TaskPriority::High),
                Task::new(alice, "a3", at(1, 9)).with_priority(TaskPriority::Low),
                Task::new(bob, "b1", at(1, 9)).with_priority(TaskPriority::High),
            ])
            .unwrap();

        let groups = store
            .count_grouped(alice, &TaskFilter::new(), GroupKey::Priority)
            .await
            .unwrap();
        assert_eq!(groups.get("High"), Some(&2));
        assert_eq!(groups.get("Low"), Some(&1));
        assert_eq!(groups.get("Medium"), None);
    }

    #[tokio::test]
    async fn test_count_by_date_bucket_range_is_inclusive() {
        let store = InMemoryTaskStore::new();
        let user = UserId::new();
        store
            .extend_tasks([
                Task::new(user, "before", at(2, 23)),
                Task::new(user, "start", at(3, 0)),
                Task::new(user, "mid", at(5, 8)),
                Task::new(user, "mid2", at(5, 20)),
                Task::new(user, "end", at(10, 0)),
                Task::new(user, "after", at(10, 1)),
            ])
            .unwrap();

        let buckets = store
            .count_by_date_bucket(
                user,
                &TaskFilter::new(),
                DateField::CreatedAt,
                at(3, 0),
                at(10, 0),
            )
            .await
            .unwrap();
        let expected: BTreeMap<String, u64> = [
            ("2024-01-03".to_string(), 1),
            ("2024-01-05".to_string(), 2),
            ("2024-01-10".to_string(), 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(buckets, expected);
    }

    #[tokio::test]
    async fn test_count_by_date_bucket_applies_filter() {
        let store = InMemoryTaskStore::new();
        let user = UserId::new();
        store
            .extend_tasks([
                Task::new(user, "open", at(1, 9)).with_updated_at(at(4, 9)),
                Task::new(user, "done", at(1, 9))
                    .with_status(TaskStatus::Completed)
                    .with_updated_at(at(4, 9)),
            ])
            .unwrap();

        let buckets = store
            .count_by_date_bucket(
                user,
                &TaskFilter::new().status(TaskStatus::Completed),
                DateField::UpdatedAt,
                at(1, 0),
                at(5, 0),
            )
            .await
            .unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets.get("2024-01-04"), Some(&1));
    }

    #[tokio::test]
    async fn test_find_user() {
        let store = InMemoryTaskStore::new();
        let user = User::new("Demo User");
        store.add_user(user.clone()).unwrap();

        assert_eq!(store.find_user(user.id).await.unwrap(), Some(user));
        assert_eq!(store.find_user(UserId::new()).await.unwrap(), None);
    }
}
