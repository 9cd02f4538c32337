use chrono::NaiveDate;
use serde::Serialize;

use super::types::{DailyPoint, ProductivityTimeline, UserStats};
use crate::model::User;

fn is_zero(n: &u64) -> bool {
    *n == 0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityDistribution {
    #[serde(rename = "High")]
    pub high: u64,
    #[serde(rename = "Medium")]
    pub medium: u64,
    #[serde(rename = "Low")]
    pub low: u64,
    #[serde(rename = "Other", skip_serializing_if = "is_zero")]
    pub other: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDistribution {
    #[serde(rename = "Todo")]
    pub todo: u64,
    #[serde(rename = "In Progress")]
    pub in_progress: u64,
    #[serde(rename = "Completed")]
    pub completed: u64,
    #[serde(rename = "Other", skip_serializing_if = "is_zero")]
    pub other: u64,
}

/// Statistics response for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatsReport {
    pub user_id: String,
    pub user_name: String,
    pub total_tasks: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub todo: u64,
    pub overdue: u64,
    pub completion_rate: f64,
    pub priority_distribution: PriorityDistribution,
    pub status_distribution: StatusDistribution,
}

impl UserStatsReport {
    pub fn new(user: &User, stats: &UserStats) -> Self {
        Self {
            user_id: user.id.to_string(),
            user_name: user.name.clone(),
            total_tasks: stats.total,
            completed: stats.completed,
            in_progress: stats.in_progress,
            todo: stats.todo,
            overdue: stats.overdue,
            completion_rate: stats.completion_rate,
            priority_distribution: PriorityDistribution {
                high: stats.high_priority,
                medium: stats.medium_priority,
                low: stats.low_priority,
                other: stats.unrecognized_priority,
            },
            status_distribution: StatusDistribution {
                todo: stats.todo,
                in_progress: stats.in_progress,
                completed: stats.completed,
                other: stats.unrecognized_status,
            },
        }
    }
}

/// Productivity timeline response for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityReport {
    pub user_id: String,
    pub period_days: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_created: u64,
    pub total_completed: u64,
    pub average_daily_completions: f64,
    pub daily_data: Vec<DailyPoint>,
}

impl ProductivityReport {
    pub fn new(user: &User, timeline: ProductivityTimeline) -> Self {
        Self {
            user_id: user.id.to_string(),
            period_days: timeline.window_days,
            start_date: timeline.start_date,
            end_date: timeline.end_date,
            total_created: timeline.total_created,
            total_completed: timeline.total_completed,
            average_daily_completions: timeline.average_daily_completions,
            daily_data: timeline.daily,
        }
    }
}
