pub mod analytics;
pub mod date_util;
pub mod error;
pub mod model;
pub mod query;
pub mod seed;
pub mod storage;

pub use analytics::{
    ProductivityReport, ProductivityTimeline, ProductivityWindow, UserStats, UserStatsReport,
};
pub use error::{Error, Result};
pub use model::{Task, TaskId, TaskPriority, TaskStatus, TaskUpdate, User, UserId};
pub use query::{InMemoryTaskStore, TaskQueryPort, UserLookup};
pub use storage::{Database, SqliteTaskStore};

use chrono::{DateTime, Utc};

/// Request-level entry point: validates the user reference and window,
/// then runs the analytics computations against the store.
pub struct TaskPulse<S> {
    store: S,
}

impl<S> TaskPulse<S>
where
    S: TaskQueryPort + UserLookup,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Parse `user_id` and confirm the user exists.
    pub async fn resolve_user(&self, user_id: &str) -> Result<User> {
        let id: UserId = user_id.parse()?;
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    /// Aggregate statistics for a user, with overdue judged against `as_of`.
    pub async fn user_stats(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<UserStatsReport> {
        let user = self.resolve_user(user_id).await?;
        let stats = analytics::compute_user_stats(&self.store, user.id, as_of).await?;
        Ok(UserStatsReport::new(&user, &stats))
    }

    /// Daily creation/completion timeline for the `days` ending at `as_of`.
    /// `days` must be within `1..=365`.
    pub async fn productivity(
        &self,
        user_id: &str,
        days: i64,
        as_of: DateTime<Utc>,
    ) -> Result<ProductivityReport> {
        let window = ProductivityWindow::new(days)?;
        let user = self.resolve_user(user_id).await?;
        let timeline =
            analytics::build_productivity_timeline(&self.store, user.id, window, as_of).await?;
        Ok(ProductivityReport::new(&user, timeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    fn service() -> (TaskPulse<InMemoryTaskStore>, User) {
        let store = InMemoryTaskStore::new();
        let user = User::new("Demo User");
        store.add_user(user.clone()).unwrap();
        store
            .add_task(
                Task::new(user.id, "done", Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
                    .with_status(TaskStatus::Completed)
                    .with_updated_at(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()),
            )
            .unwrap();
        (TaskPulse::new(store), user)
    }

    #[tokio::test]
    async fn test_user_stats_report() {
        let (svc, user) = service();
        let report = svc.user_stats(&user.id.to_string(), as_of()).await.unwrap();
        assert_eq!(report.user_id, user.id.to_string());
        assert_eq!(report.user_name, "Demo User");
        assert_eq!(report.total_tasks, 1);
        assert_eq!(report.completion_rate, 100.0);
        assert_eq!(report.status_distribution.completed, 1);
    }

    #[tokio::test]
    async fn test_productivity_report() {
        let (svc, user) = service();
        let report = svc
            .productivity(&user.id.to_string(), 7, as_of())
            .await
            .unwrap();
        assert_eq!(report.period_days, 7);
        assert_eq!(report.start_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(report.end_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(report.daily_data.len(), 8);
        assert_eq!(report.total_completed, 1);
    }

    #[tokio::test]
    async fn test_malformed_user_id() {
        let (svc, _) = service();
        let err = svc.user_stats("not-a-user", as_of()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUserReference(_)));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (svc, _) = service();
        let missing = UserId::new().to_string();
        let err = svc.user_stats(&missing, as_of()).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound(id) if id == missing));

        let err = svc.productivity(&missing, 30, as_of()).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_window_rejected_before_lookup() {
        let (svc, user) = service();
        for days in [0, -1, 366, 1000] {
            let err = svc
                .productivity(&user.id.to_string(), days, as_of())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidWindow(d) if d == days));
        }
        // Window is checked first, even for a malformed user
        let err = svc.productivity("nope", 0, as_of()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidWindow(0)));
    }
}
