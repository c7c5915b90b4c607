use chrono::{DateTime, TimeZone};

/// Inclusive day range requested by the caller.
///
/// A range whose start is after its end is valid and simply yields no days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> DateRange<Tz> {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self { start, end }
    }

    pub fn single(day: DateTime<Tz>) -> Self {
        Self {
            start: day.clone(),
            end: day,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}
