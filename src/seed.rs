use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::model::{Task, TaskPriority, TaskStatus, User, UserId};
use crate::storage::{repository, Database};

/// Sample tasks for a demo user, positioned relative to `as_of` so the
/// default 30-day timeline and the overdue count both have something to show.
pub fn demo_tasks(user: UserId, as_of: DateTime<Utc>) -> Vec<Task> {
    let days = Duration::days;
    // (title, priority, status, created days ago, completed days ago, due in days)
    let samples: [(&str, TaskPriority, TaskStatus, i64, Option<i64>, i64); 8] = [
        ("Set up project repository", TaskPriority::High, TaskStatus::Completed, 12, Some(10), -9),
        ("Design database schema", TaskPriority::High, TaskStatus::Completed, 11, Some(7), -6),
        ("Implement authentication", TaskPriority::High, TaskStatus::InProgress, 9, None, -1),
        ("Build task CRUD API", TaskPriority::Medium, TaskStatus::InProgress, 8, None, 2),
        ("Create dashboard UI", TaskPriority::Medium, TaskStatus::Todo, 5, None, 3),
        ("Write unit tests", TaskPriority::Low, TaskStatus::Todo, 4, None, 5),
        ("Deploy application", TaskPriority::Medium, TaskStatus::Todo, 2, None, 7),
        ("Write documentation", TaskPriority::Low, TaskStatus::Todo, 1, None, 6),
    ];

    samples
        .into_iter()
        .map(|(title, priority, status, created_ago, completed_ago, due_in)| {
            let created = as_of - days(created_ago);
            let updated = completed_ago.map_or(created, |ago| as_of - days(ago));
            Task::new(user, title, created)
                .with_priority(priority)
                .with_status(status)
                .with_due_date(as_of + days(due_in))
                .with_updated_at(updated)
        })
        .collect()
}

/// Insert a demo user with sample tasks. Returns the new user.
pub async fn seed_demo(db: &Database, as_of: DateTime<Utc>) -> Result<User> {
    let user = User::new("Demo User");
    let tasks = demo_tasks(user.id, as_of);
    log::info!("Seeding demo user {} with {} tasks", user.id, tasks.len());

    db.writer()
        .call({
            let user = user.clone();
            move |conn| {
                let tx = conn.transaction()?;
                repository::upsert_user(&tx, &user, &as_of)?;
                for task in &tasks {
                    repository::upsert_task(&tx, task)?;
                }
                tx.commit()?;
                Ok::<(), rusqlite::Error>(())
            }
        })
        .await?;

    Ok(user)
}
