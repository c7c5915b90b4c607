use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Data types a health store can be asked about. Only step count is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthDataType {
    #[default]
    StepCount,
}

impl HealthDataType {
    pub fn label(&self) -> &'static str {
        match self {
            HealthDataType::StepCount => "Step Count",
        }
    }
}

/// One reading from the health store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSample {
    /// The sample's own timestamp; window membership and hour labels use it.
    pub start: DateTime<Utc>,
    pub quantity: f64,
}

impl StepSample {
    pub fn new(start: DateTime<Utc>, quantity: f64) -> Self {
        Self { start, quantity }
    }

    /// Whether the sample lies in `[start, end)`.
    pub fn in_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start >= start && self.start < end
    }
}
