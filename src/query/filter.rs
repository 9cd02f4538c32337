use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;

use crate::date_util::to_db_timestamp;
use crate::model::{Task, TaskPriority, TaskStatus};

/// Field a grouped count is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Status,
    Priority,
}

impl GroupKey {
    pub fn column(&self) -> &'static str {
        match self {
            GroupKey::Status => "t.status",
            GroupKey::Priority => "t.priority",
        }
    }

    pub fn value_of<'a>(&self, task: &'a Task) -> &'a str {
        match self {
            GroupKey::Status => &task.status,
            GroupKey::Priority => &task.priority,
        }
    }
}

/// Timestamp field used for day bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    CreatedAt,
    UpdatedAt,
}

impl DateField {
    pub fn column(&self) -> &'static str {
        match self {
            DateField::CreatedAt => "t.created_at",
            DateField::UpdatedAt => "t.updated_at",
        }
    }

    pub fn value_of(&self, task: &Task) -> DateTime<Utc> {
        match self {
            DateField::CreatedAt => task.created_at,
            DateField::UpdatedAt => task.updated_at,
        }
    }
}

/// Predicate over a user's tasks, usable both as SQL and in memory.
/// An empty filter matches every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    status: Option<TaskStatus>,
    status_not: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_before: Option<DateTime<Utc>>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Exclude one status. Tasks with unrecognized status strings still match.
    pub fn status_not(mut self, status: TaskStatus) -> Self {
        self.status_not = Some(status);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Only tasks that have a due date strictly before `ts`.
    pub fn due_before(mut self, ts: DateTime<Utc>) -> Self {
        self.due_before = Some(ts);
        self
    }

    /// Open tasks whose due date has passed as of `as_of`.
    pub fn overdue(as_of: DateTime<Utc>) -> Self {
        Self::new().status_not(TaskStatus::Completed).due_before(as_of)
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status.as_str() {
                return false;
            }
        }
        if let Some(status) = self.status_not {
            if task.status == status.as_str() {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority.as_str() {
                return false;
            }
        }
        if let Some(ts) = self.due_before {
            match task.due_date {
                Some(due) if due < ts => {}
                _ => return false,
            }
        }
        true
    }

    /// SQL conditions to append after an existing `WHERE` clause, each
    /// prefixed with ` AND `. Parameters are numbered from `first_idx`.
    pub fn build_sql(&self, first_idx: usize) -> (String, Vec<Box<dyn ToSql>>) {
        let mut wheres: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        let mut param_idx = first_idx;

        if let Some(status) = self.status {
            wheres.push(format!("t.status = ?{param_idx}"));
            params.push(Box::new(status.as_str()));
            param_idx += 1;
        }
        if let Some(status) = self.status_not {
            wheres.push(format!("t.status != ?{param_idx}"));
            params.push(Box::new(status.as_str()));
            param_idx += 1;
        }
        if let Some(priority) = self.priority {
            wheres.push(format!("t.priority = ?{param_idx}"));
            params.push(Box::new(priority.as_str()));
            param_idx += 1;
        }
        if let Some(ts) = self.due_before {
            wheres.push(format!("t.due_date IS NOT NULL AND t.due_date < ?{param_idx}"));
            params.push(Box::new(to_db_timestamp(&ts)));
        }

        let sql = wheres
            .iter()
            .map(|w| format!(" AND {w}"))
            .collect::<String>();
        (sql, params)
    }
}
