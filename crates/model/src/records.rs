use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: u32 = 24;

/// Steps counted in one hour bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    /// Full `yyyy-MM-dd HH` key taken from the last sample in the bucket.
    pub hour_key: String,
    /// Truncated sum. Hours summing to zero or less are never recorded.
    pub steps: u64,
}

impl HourlyCount {
    pub fn new(hour_key: impl Into<String>, steps: u64) -> Self {
        Self {
            hour_key: hour_key.into(),
            steps,
        }
    }

    /// The `HH` part of the key, or the whole key if it has no hour part.
    pub fn hour_label(&self) -> &str {
        self.hour_key
            .rsplit_once(' ')
            .map(|(_, hour)| hour)
            .unwrap_or(&self.hour_key)
    }
}

/// Aggregated steps for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    /// The instant the day's queries were anchored on: the range start for
    /// the first day, local midnight for the rest.
    pub day: DateTime<Utc>,
    /// Non-zero hours only, in completion order. Sort before display.
    pub hours: Vec<HourlyCount>,
    #[serde(default)]
    pub failed_queries: u32,
}

impl DayRecord {
    pub fn new(day: DateTime<Utc>, hours: Vec<HourlyCount>) -> Self {
        Self {
            day,
            hours,
            failed_queries: 0,
        }
    }

    pub fn total_steps(&self) -> u64 {
        self.hours.iter().map(|h| h.steps).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_queries == 0
    }
}
