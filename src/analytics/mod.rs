pub mod report;
pub mod types;

pub use report::{PriorityDistribution, ProductivityReport, StatusDistribution, UserStatsReport};
pub use types::*;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::date_util::{days_inclusive, round_to, DATE_KEY_FORMAT};
use crate::error::Result;
use crate::model::{TaskPriority, TaskStatus, UserId};
use crate::query::{DateField, GroupKey, TaskFilter, TaskQueryPort};

/// Compute status, priority and overdue counts for a user.
///
/// `as_of` is the reference time for the overdue check. A user without
/// tasks yields the all-zero snapshot.
pub async fn compute_user_stats<P>(
    port: &P,
    user: UserId,
    as_of: DateTime<Utc>,
) -> Result<UserStats>
where
    P: TaskQueryPort + ?Sized,
{
    log::debug!("Computing stats for user {user} as of {as_of}");

    let all = TaskFilter::new();
    let overdue_filter = TaskFilter::overdue(as_of);
    let (by_status, by_priority, overdue) = tokio::try_join!(
        port.count_grouped(user, &all, GroupKey::Status),
        port.count_grouped(user, &all, GroupKey::Priority),
        port.count_grouped(user, &overdue_filter, GroupKey::Status),
    )?;

    let mut stats = UserStats::default();
    for (value, &count) in &by_status {
        stats.total += count;
        match value.parse::<TaskStatus>() {
            Ok(TaskStatus::Todo) => stats.todo += count,
            Ok(TaskStatus::InProgress) => stats.in_progress += count,
            Ok(TaskStatus::Completed) => stats.completed += count,
            Err(_) => {
                log::warn!("User {user} has {count} task(s) with unrecognized status '{value}'");
                stats.unrecognized_status += count;
            }
        }
    }
    for (value, &count) in &by_priority {
        match value.parse::<TaskPriority>() {
            Ok(TaskPriority::High) => stats.high_priority += count,
            Ok(TaskPriority::Medium) => stats.medium_priority += count,
            Ok(TaskPriority::Low) => stats.low_priority += count,
            Err(_) => {
                log::warn!("User {user} has {count} task(s) with unrecognized priority '{value}'");
                stats.unrecognized_priority += count;
            }
        }
    }
    stats.overdue = overdue.values().sum();
    stats.completion_rate = completion_rate(stats.completed, stats.total);

    Ok(stats)
}

/// Build the daily created/completed series for the `window` days ending at
/// `as_of`. Completion day is taken from `updated_at` of completed tasks.
pub async fn build_productivity_timeline<P>(
    port: &P,
    user: UserId,
    window: ProductivityWindow,
    as_of: DateTime<Utc>,
) -> Result<ProductivityTimeline>
where
    P: TaskQueryPort + ?Sized,
{
    let start = as_of - Duration::days(window.days() as i64);
    log::debug!(
        "Building {}-day timeline for user {user} from {start} to {as_of}",
        window.days()
    );

    let created_filter = TaskFilter::new();
    let completed_filter = TaskFilter::new().status(TaskStatus::Completed);
    let (created, completed) = tokio::try_join!(
        port.count_by_date_bucket(user, &created_filter, DateField::CreatedAt, start, as_of),
        port.count_by_date_bucket(user, &completed_filter, DateField::UpdatedAt, start, as_of),
    )?;

    Ok(fill_timeline(
        window,
        start.date_naive(),
        as_of.date_naive(),
        &created,
        &completed,
    ))
}

fn completion_rate(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(completed as f64 / total as f64 * 100.0, 1)
}

/// Expand sparse day buckets into one point per day; missing days count zero.
fn fill_timeline(
    window: ProductivityWindow,
    start_date: NaiveDate,
    end_date: NaiveDate,
    created: &BTreeMap<String, u64>,
    completed: &BTreeMap<String, u64>,
) -> ProductivityTimeline {
    let mut daily = Vec::with_capacity(window.days() as usize + 1);
    let mut total_created = 0;
    let mut total_completed = 0;

    for date in days_inclusive(start_date, end_date) {
        let key = date.format(DATE_KEY_FORMAT).to_string();
        let created = created.get(&key).copied().unwrap_or(0);
        let completed = completed.get(&key).copied().unwrap_or(0);
        total_created += created;
        total_completed += completed;
        daily.push(DailyPoint {
            date,
            created,
            completed,
        });
    }

    ProductivityTimeline {
        window_days: window.days(),
        start_date,
        end_date,
        daily,
        total_created,
        total_completed,
        average_daily_completions: round_to(total_completed as f64 / window.days() as f64, 2),
    }
}
