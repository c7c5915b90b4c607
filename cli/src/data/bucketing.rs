//! Day and hour keys under one fixed timezone, calendar and locale.
//!
//! Every formatter and parser for `yyyy-MM-dd` and `yyyy-MM-dd HH` lives
//! here. Arithmetic is done on local wall-clock dates so that a day is a
//! calendar day, not a fixed 24 hours.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

pub const DAY_FORMAT: &str = "%Y-%m-%d";
pub const HOUR_FORMAT: &str = "%Y-%m-%d %H";
pub const DEFAULT_LOCALE: &str = "ko_KR";

/// Longest local-time gap a transition can open, in minutes.
const MAX_GAP_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct DateBucketing<Tz: TimeZone> {
    tz: Tz,
    locale: String,
}

impl<Tz: TimeZone> DateBucketing<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    /// Locale only affects month and weekday names, which no key uses.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn local_date<T: TimeZone>(&self, ts: &DateTime<T>) -> NaiveDate {
        ts.with_timezone(&self.tz).date_naive()
    }

    pub fn day_key<T: TimeZone>(&self, ts: &DateTime<T>) -> String {
        ts.with_timezone(&self.tz)
            .naive_local()
            .format(DAY_FORMAT)
            .to_string()
    }

    pub fn hour_key<T: TimeZone>(&self, ts: &DateTime<T>) -> String {
        ts.with_timezone(&self.tz)
            .naive_local()
            .format(HOUR_FORMAT)
            .to_string()
    }

    /// Local midnight of the day named by `s`, or `None` if malformed.
    pub fn parse_day(&self, s: &str) -> Option<DateTime<Tz>> {
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .ok()
            .map(|date| self.resolve(date.and_time(NaiveTime::MIN)))
    }

    /// Local start of the hour named by `s`, or `None` if malformed.
    pub fn parse_hour(&self, s: &str) -> Option<DateTime<Tz>> {
        let (date, hour) = s.split_once(' ')?;
        let date = NaiveDate::parse_from_str(date, DAY_FORMAT).ok()?;

        if hour.is_empty() || hour.len() > 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hour: u32 = hour.parse().ok()?;
        let time = NaiveTime::from_hms_opt(hour, 0, 0)?;

        Some(self.resolve(date.and_time(time)))
    }

    /// Local midnight of the calendar day after `ts`.
    ///
    /// Saturates at the last representable day.
    pub fn next_day<T: TimeZone>(&self, ts: &DateTime<T>) -> DateTime<Tz> {
        self.add_days(ts, 1)
    }

    /// Local midnight `days` calendar days away from the day of `ts`.
    pub fn add_days<T: TimeZone>(&self, ts: &DateTime<T>, days: i64) -> DateTime<Tz> {
        let date = self.local_date(ts);
        let shifted = date
            .checked_add_signed(Duration::days(days))
            .unwrap_or(date);
        self.resolve(shifted.and_time(NaiveTime::MIN))
    }

    pub fn day_start<T: TimeZone>(&self, ts: &DateTime<T>) -> DateTime<Tz> {
        self.date_at(ts, 0)
    }

    /// Wall-clock `hour` o'clock on the day of `ts`. Hours past 23 roll
    /// into the following days.
    pub fn date_at<T: TimeZone>(&self, ts: &DateTime<T>, hour: u32) -> DateTime<Tz> {
        let midnight = self.local_date(ts).and_time(NaiveTime::MIN);
        let local = midnight
            .checked_add_signed(Duration::hours(i64::from(hour)))
            .unwrap_or(midnight);
        self.resolve(local)
    }

    /// Map a local wall-clock time onto an instant.
    ///
    /// Ambiguous times take the earlier instant. Times skipped by a
    /// forward transition move to the first valid minute after the gap.
    fn resolve(&self, local: NaiveDateTime) -> DateTime<Tz> {
        if let Some(dt) = self.tz.from_local_datetime(&local).earliest() {
            return dt;
        }

        (1..=MAX_GAP_MINUTES)
            .filter_map(|m| local.checked_add_signed(Duration::minutes(m)))
            .find_map(|probe| self.tz.from_local_datetime(&probe).earliest())
            .unwrap_or_else(|| self.tz.from_utc_datetime(&local))
    }
}
