use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use futures::future::join_all;
use stride_health::HealthStore;
use stride_model::{DateRange, DayRecord, HourlyCount, StepSample, HOURS_PER_DAY};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::data::DateBucketing;

enum HourOutcome {
    Counted(HourlyCount),
    Empty,
    Failed,
}

/// Builds day records from hourly step queries against a health store.
#[derive(Clone)]
pub struct StepAggregator<Tz: TimeZone> {
    store: Arc<dyn HealthStore>,
    bucketing: Arc<DateBucketing<Tz>>,
}

impl<Tz: TimeZone> StepAggregator<Tz> {
    pub fn new(store: Arc<dyn HealthStore>, bucketing: Arc<DateBucketing<Tz>>) -> Self {
        Self { store, bucketing }
    }

    /// One record per calendar day in `range`, in no particular order.
    ///
    /// Never fails: a query error only removes that hour from its day.
    pub async fn aggregate(&self, range: &DateRange<Tz>) -> Vec<DayRecord> {
        if range.is_empty() {
            debug!(
                start = %self.bucketing.day_key(&range.start),
                end = %self.bucketing.day_key(&range.end),
                "Start is after end, nothing to aggregate"
            );
            return Vec::new();
        }

        let days = self.days_in(range);
        info!(
            days = days.len(),
            queries = days.len() * HOURS_PER_DAY as usize,
            "Aggregating step counts"
        );

        let tasks: Vec<_> = days.iter().map(|day| self.aggregate_day(day)).collect();
        join_all(tasks).await
    }

    /// The start of every day task: `range.start`, then each following
    /// local midnight up to and including `range.end`.
    pub fn days_in(&self, range: &DateRange<Tz>) -> Vec<DateTime<Tz>> {
        let mut days = Vec::new();
        let mut current = range.start.clone();

        while current <= range.end {
            let next = self.bucketing.next_day(&current);
            let stalled = next <= current;
            days.push(current);
            if stalled {
                break;
            }
            current = next;
        }

        days
    }

    async fn aggregate_day(&self, day: &DateTime<Tz>) -> DayRecord {
        let queries: Vec<_> = (0..HOURS_PER_DAY)
            .map(|hour| self.aggregate_hour(day, hour))
            .collect();
        let outcomes = join_all(queries).await;

        let mut hours = Vec::new();
        let mut failed_queries = 0;
        for outcome in outcomes {
            match outcome {
                HourOutcome::Counted(count) => hours.push(count),
                HourOutcome::Empty => {}
                HourOutcome::Failed => failed_queries += 1,
            }
        }

        let day_key = self.bucketing.day_key(day);
        if failed_queries > 0 {
            warn!(
                day = %day_key,
                failed = failed_queries,
                "{} of {} hour queries failed",
                failed_queries,
                HOURS_PER_DAY
            );
        }
        debug!(day = %day_key, hours = hours.len(), "Day aggregated");

        DayRecord {
            day: day.with_timezone(&Utc),
            hours,
            failed_queries,
        }
    }

    async fn aggregate_hour(&self, day: &DateTime<Tz>, hour: u32) -> HourOutcome {
        let window_start = self.bucketing.date_at(day, hour).with_timezone(&Utc);
        let window_end = self.bucketing.date_at(day, hour + 1).with_timezone(&Utc);

        match self.store.query_step_samples(window_start, window_end).await {
            Ok(samples) => match self.sum_hour(&samples) {
                Some(count) => HourOutcome::Counted(count),
                None => HourOutcome::Empty,
            },
            Err(e) => {
                warn!(
                    error = %e,
                    window_start = %window_start.to_rfc3339(),
                    "Step query failed"
                );
                HourOutcome::Failed
            }
        }
    }

    /// Sum one window's samples into an hourly count.
    ///
    /// The key comes from the last sample's own start. A sum of zero or
    /// less yields `None`; otherwise the sum is truncated, not each sample.
    pub fn sum_hour(&self, samples: &[StepSample]) -> Option<HourlyCount> {
        let mut steps = 0.0_f64;
        let mut hour_key = String::new();

        for sample in samples {
            hour_key = self.bucketing.hour_key(&sample.start);
            steps += sample.quantity;
        }

        if steps == 0.0 {
            return None;
        }
        if steps < 0.0 {
            debug!(hour = %hour_key, steps, "Negative step sum dropped");
            return None;
        }

        trace!(hour = %hour_key, steps, "Hour counted");
        Some(HourlyCount::new(hour_key, steps as u64))
    }
}

impl<Tz> StepAggregator<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    /// Run [`aggregate`](Self::aggregate) on a runtime worker. The handle
    /// resolves off the caller's task; consumers await it before touching
    /// their own view state.
    pub fn spawn(&self, range: DateRange<Tz>) -> JoinHandle<Vec<DayRecord>> {
        let aggregator = self.clone();
        tokio::spawn(async move { aggregator.aggregate(&range).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;
    use stride_health::MemoryHealthStore;

    use crate::data::DayList;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn aggregator(store: Arc<MemoryHealthStore>) -> StepAggregator<Utc> {
        StepAggregator::new(store, Arc::new(DateBucketing::new(Utc)))
    }

    fn day_range(from: &str, to: &str) -> DateRange<Utc> {
        let bucketing = DateBucketing::new(Utc);
        DateRange::new(
            bucketing.parse_day(from).unwrap(),
            bucketing.parse_day(to).unwrap(),
        )
    }

    #[tokio::test]
    async fn inverted_range_issues_no_queries() {
        let store = Arc::new(MemoryHealthStore::new(vec![StepSample::new(
            utc(2024, 1, 2, 5, 0),
            10.0,
        )]));
        let records = aggregator(store.clone())
            .aggregate(&day_range("2024-01-03", "2024-01-01"))
            .await;

        assert!(records.is_empty());
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn single_day_range_yields_one_record_from_24_queries() {
        let store = Arc::new(MemoryHealthStore::default());
        let records = aggregator(store.clone())
            .aggregate(&day_range("2024-01-01", "2024-01-01"))
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(store.query_count(), 24);
    }

    #[tokio::test]
    async fn day_without_samples_is_kept_empty() {
        let store = Arc::new(MemoryHealthStore::new(vec![StepSample::new(
            utc(2024, 1, 1, 9, 0),
            100.0,
        )]));
        let records = aggregator(store)
            .aggregate(&day_range("2024-01-01", "2024-01-02"))
            .await;
        let list = DayList::new(records);

        assert_eq!(list.records().len(), 2);
        assert_eq!(list.records()[0].total_steps(), 100);
        assert!(list.records()[1].is_empty());
        assert_eq!(list.records()[1].day, utc(2024, 1, 2, 0, 0));
    }

    #[tokio::test]
    async fn samples_in_one_hour_are_summed() {
        let store = Arc::new(MemoryHealthStore::new(vec![
            StepSample::new(utc(2024, 1, 1, 5, 30), 3.0),
            StepSample::new(utc(2024, 1, 1, 5, 45), 2.0),
        ]));
        let records = aggregator(store)
            .aggregate(&day_range("2024-01-01", "2024-01-01"))
            .await;

        assert_eq!(records[0].hours, vec![HourlyCount::new("2024-01-01 05", 5)]);
    }

    #[test]
    fn zero_quantity_hour_is_dropped() {
        let aggregator = aggregator(Arc::new(MemoryHealthStore::default()));

        assert_eq!(
            aggregator.sum_hour(&[StepSample::new(utc(2024, 1, 1, 8, 0), 0.0)]),
            None
        );
        assert_eq!(aggregator.sum_hour(&[]), None);
    }

    #[test]
    fn negative_sum_is_dropped_not_clamped() {
        let aggregator = aggregator(Arc::new(MemoryHealthStore::default()));

        assert_eq!(
            aggregator.sum_hour(&[StepSample::new(utc(2024, 1, 1, 8, 0), -3.0)]),
            None
        );
        assert_eq!(
            aggregator.sum_hour(&[
                StepSample::new(utc(2024, 1, 1, 8, 0), -3.0),
                StepSample::new(utc(2024, 1, 1, 8, 30), 10.0),
            ]),
            Some(HourlyCount::new("2024-01-01 08", 7))
        );
    }

    #[test]
    fn sum_is_truncated_after_adding() {
        let aggregator = aggregator(Arc::new(MemoryHealthStore::default()));
        let count = aggregator.sum_hour(&[
            StepSample::new(utc(2024, 1, 1, 8, 0), 2.6),
            StepSample::new(utc(2024, 1, 1, 8, 10), 2.6),
        ]);

        assert_eq!(count, Some(HourlyCount::new("2024-01-01 08", 5)));
    }

    #[test]
    fn hour_key_follows_the_last_sample() {
        let aggregator = aggregator(Arc::new(MemoryHealthStore::default()));
        let count = aggregator.sum_hour(&[
            StepSample::new(utc(2024, 1, 1, 8, 0), 1.0),
            StepSample::new(utc(2024, 1, 1, 9, 0), 1.0),
        ]);

        assert_eq!(count, Some(HourlyCount::new("2024-01-01 09", 2)));
    }

    #[tokio::test]
    async fn failed_hour_does_not_hide_the_rest() {
        let store = Arc::new(MemoryHealthStore::new(vec![
            StepSample::new(utc(2024, 1, 1, 5, 10), 40.0),
            StepSample::new(utc(2024, 1, 1, 6, 10), 60.0),
            StepSample::new(utc(2024, 1, 2, 7, 10), 80.0),
        ]));
        store.fail_window(utc(2024, 1, 1, 5, 0));

        let records = aggregator(store)
            .aggregate(&day_range("2024-01-01", "2024-01-02"))
            .await;
        let list = DayList::new(records);

        let first = &list.records()[0];
        assert_eq!(first.failed_queries, 1);
        assert_eq!(first.hours, vec![HourlyCount::new("2024-01-01 06", 60)]);

        let second = &list.records()[1];
        assert!(second.is_complete());
        assert_eq!(second.total_steps(), 80);
    }

    #[tokio::test]
    async fn last_hour_window_ends_at_next_midnight() {
        let store = Arc::new(MemoryHealthStore::new(vec![
            StepSample::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
                7.0,
            ),
            StepSample::new(utc(2024, 1, 2, 0, 0), 9.0),
        ]));
        let records = aggregator(store)
            .aggregate(&day_range("2024-01-01", "2024-01-01"))
            .await;

        assert_eq!(records[0].hours, vec![HourlyCount::new("2024-01-01 23", 7)]);
    }

    #[tokio::test]
    async fn hours_are_bucketed_in_local_time() {
        let bucketing = Arc::new(DateBucketing::new(FixedOffset::east_opt(9 * 3600).unwrap()));
        let store = Arc::new(MemoryHealthStore::new(vec![StepSample::new(
            utc(2023, 12, 31, 20, 30),
            12.0,
        )]));
        let range = DateRange::single(bucketing.parse_day("2024-01-01").unwrap());

        let records = StepAggregator::new(store, bucketing).aggregate(&range).await;

        assert_eq!(records[0].day, utc(2023, 12, 31, 15, 0));
        assert_eq!(records[0].hours, vec![HourlyCount::new("2024-01-01 05", 12)]);
    }

    #[tokio::test]
    async fn spawned_aggregation_resolves_through_its_handle() {
        let store = Arc::new(MemoryHealthStore::new(vec![StepSample::new(
            utc(2024, 1, 3, 12, 0),
            1000.0,
        )]));
        let handle = aggregator(store).spawn(day_range("2024-01-01", "2024-01-03"));
        let list = DayList::new(handle.await.unwrap());

        let totals: Vec<u64> = list.records().iter().map(|r| r.total_steps()).collect();
        assert_eq!(totals, vec![0, 0, 1000]);
    }

    #[test]
    fn days_in_starts_at_the_given_instant() {
        let aggregator = aggregator(Arc::new(MemoryHealthStore::default()));
        let range = DateRange::new(utc(2024, 1, 1, 13, 0), utc(2024, 1, 3, 0, 0));

        assert_eq!(
            aggregator.days_in(&range),
            vec![
                utc(2024, 1, 1, 13, 0),
                utc(2024, 1, 2, 0, 0),
                utc(2024, 1, 3, 0, 0)
            ]
        );
    }
}
