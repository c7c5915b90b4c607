//! View models for the day list and the hour drill-down.

use chrono::{DateTime, TimeZone};
use stride_model::{DayRecord, HourlyCount};

use crate::data::DateBucketing;

/// One line of the day list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub date: String,
    pub total_steps: u64,
    pub failed_queries: u32,
}

/// One line of the hour list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRow {
    pub hour: String,
    pub steps: u64,
}

/// Day records in ascending day order.
#[derive(Debug, Clone, Default)]
pub struct DayList {
    records: Vec<DayRecord>,
}

impl DayList {
    pub fn new(mut records: Vec<DayRecord>) -> Self {
        records.sort_by_key(|r| r.day);
        Self { records }
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_steps(&self) -> u64 {
        self.records.iter().map(DayRecord::total_steps).sum()
    }

    /// The record whose day falls on `day` in the bucketing timezone.
    pub fn find<Tz: TimeZone>(
        &self,
        bucketing: &DateBucketing<Tz>,
        day: &DateTime<Tz>,
    ) -> Option<&DayRecord> {
        let wanted = bucketing.local_date(day);
        self.records
            .iter()
            .find(|r| bucketing.local_date(&r.day) == wanted)
    }

    pub fn rows<Tz: TimeZone>(&self, bucketing: &DateBucketing<Tz>) -> Vec<DayRow> {
        self.records
            .iter()
            .map(|r| DayRow {
                date: bucketing.day_key(&r.day),
                total_steps: r.total_steps(),
                failed_queries: r.failed_queries,
            })
            .collect()
    }
}

/// One day's hourly counts in ascending hour order.
///
/// Entries whose key does not parse as an hour sort before all others.
#[derive(Debug, Clone)]
pub struct HourList {
    entries: Vec<HourlyCount>,
}

impl HourList {
    pub fn new<Tz: TimeZone>(bucketing: &DateBucketing<Tz>, record: &DayRecord) -> Self {
        let mut entries = record.hours.clone();
        entries.sort_by_cached_key(|h| bucketing.parse_hour(&h.hour_key));
        Self { entries }
    }

    pub fn entries(&self) -> &[HourlyCount] {
        &self.entries
    }

    pub fn rows(&self) -> Vec<HourRow> {
        self.entries
            .iter()
            .map(|h| HourRow {
                hour: h.hour_label().to_string(),
                steps: h.steps,
            })
            .collect()
    }
}
