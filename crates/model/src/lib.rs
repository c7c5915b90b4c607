mod range;
mod records;
mod sample;

pub use range::DateRange;
pub use records::{DayRecord, HourlyCount, HOURS_PER_DAY};
pub use sample::{HealthDataType, StepSample};
