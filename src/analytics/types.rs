use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};

/// Aggregate task statistics for one user at a reference time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserStats {
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub todo: u64,
    /// Tasks whose stored status is none of the known values.
    pub unrecognized_status: u64,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
    /// Tasks whose stored priority is none of the known values.
    pub unrecognized_priority: u64,
    /// Not completed, with a due date before the reference time.
    pub overdue: u64,
    /// Percentage of tasks completed, one decimal place.
    pub completion_rate: f64,
}

/// Created and completed counts for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub created: u64,
    pub completed: u64,
}

/// Day-by-day creation and completion series over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityTimeline {
    pub window_days: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// One point per day from `start_date` through `end_date`, ascending.
    pub daily: Vec<DailyPoint>,
    pub total_created: u64,
    pub total_completed: u64,
    /// `total_completed / window_days`, two decimal places.
    pub average_daily_completions: f64,
}

/// Length of a productivity window in days, always within `1..=365`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProductivityWindow(u32);

impl ProductivityWindow {
    pub const MIN_DAYS: u32 = 1;
    pub const MAX_DAYS: u32 = 365;
    pub const DEFAULT_DAYS: u32 = 30;

    pub fn new(days: i64) -> Result<Self> {
        if days < Self::MIN_DAYS as i64 || days > Self::MAX_DAYS as i64 {
            return Err(Error::InvalidWindow(days));
        }
        Ok(Self(days as u32))
    }

    pub fn days(&self) -> u32 {
        self.0
    }
}

impl Default for ProductivityWindow {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}
