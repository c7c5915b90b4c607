//! Validation of user-entered dates and periods.

use chrono::{DateTime, TimeZone};
use stride_model::DateRange;

use crate::data::DateBucketing;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedInputError {
    #[error("Please enter a start date (YYYY-MM-DD)")]
    MissingStart,

    #[error("Invalid start date '{0}', expected YYYY-MM-DD")]
    Start(String),

    #[error("Invalid end date '{0}', expected YYYY-MM-DD")]
    End(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    Day(String),

    #[error("Unknown period '{0}', expected today, week or month")]
    Period(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Today,
    #[default]
    Week,
    Month,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "today" | "day" => Some(Period::Today),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            _ => None,
        }
    }

    /// Days covered, including today.
    pub fn days(&self) -> i64 {
        match self {
            Period::Today => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }
}

/// Range arguments as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct RangeInput {
    pub from: Option<String>,
    pub to: Option<String>,
    pub period: Option<String>,
}

pub fn parse_day<Tz: TimeZone>(
    bucketing: &DateBucketing<Tz>,
    s: &str,
) -> Result<DateTime<Tz>, MalformedInputError> {
    bucketing
        .parse_day(s.trim())
        .ok_or_else(|| MalformedInputError::Day(s.to_string()))
}

/// Resolve explicit dates or a period ending today into a day range.
///
/// An explicit `to` without a `from` is rejected; a `from` alone runs to
/// today. With neither, the period (default: week) applies.
pub fn parse_range<Tz: TimeZone>(
    bucketing: &DateBucketing<Tz>,
    input: &RangeInput,
    now: &DateTime<Tz>,
) -> Result<DateRange<Tz>, MalformedInputError> {
    let today = bucketing.day_start(now);

    match (&input.from, &input.to) {
        (Some(from), to) => {
            let start = bucketing
                .parse_day(from.trim())
                .ok_or_else(|| MalformedInputError::Start(from.clone()))?;
            let end = match to {
                Some(to) => bucketing
                    .parse_day(to.trim())
                    .ok_or_else(|| MalformedInputError::End(to.clone()))?,
                None => today,
            };
            Ok(DateRange::new(start, end))
        }
        (None, Some(_)) => Err(MalformedInputError::MissingStart),
        (None, None) => {
            let period = match &input.period {
                Some(p) => Period::parse(p).ok_or_else(|| MalformedInputError::Period(p.clone()))?,
                None => Period::default(),
            };
            let start = bucketing.add_days(&today, 1 - period.days());
            Ok(DateRange::new(start, today))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 18, 20, 0).unwrap()
    }

    fn input(from: Option<&str>, to: Option<&str>, period: Option<&str>) -> RangeInput {
        RangeInput {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            period: period.map(str::to_string),
        }
    }

    fn keys(bucketing: &DateBucketing<Utc>, range: &DateRange<Utc>) -> (String, String) {
        (bucketing.day_key(&range.start), bucketing.day_key(&range.end))
    }

    #[test]
    fn explicit_dates_are_used_as_given() {
        let bucketing = DateBucketing::new(Utc);
        let range = parse_range(
            &bucketing,
            &input(Some("2024-01-01"), Some("2024-01-07"), None),
            &now(),
        )
        .unwrap();

        assert_eq!(
            keys(&bucketing, &range),
            ("2024-01-01".to_string(), "2024-01-07".to_string())
        );
    }

    #[test]
    fn inverted_dates_are_accepted() {
        let bucketing = DateBucketing::new(Utc);
        let range = parse_range(
            &bucketing,
            &input(Some("2024-01-07"), Some("2024-01-01"), None),
            &now(),
        )
        .unwrap();

        assert!(range.is_empty());
    }

    #[test]
    fn start_alone_runs_to_today() {
        let bucketing = DateBucketing::new(Utc);
        let range = parse_range(&bucketing, &input(Some("2024-03-10"), None, None), &now()).unwrap();

        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn malformed_dates_are_reported() {
        let bucketing = DateBucketing::new(Utc);

        assert_eq!(
            parse_range(&bucketing, &input(Some("yesterday"), None, None), &now()),
            Err(MalformedInputError::Start("yesterday".to_string()))
        );
        assert_eq!(
            parse_range(&bucketing, &input(Some("2024-01-01"), Some("01/07"), None), &now()),
            Err(MalformedInputError::End("01/07".to_string()))
        );
        assert_eq!(
            parse_range(&bucketing, &input(None, Some("2024-01-07"), None), &now()),
            Err(MalformedInputError::MissingStart)
        );
        assert!(parse_day(&bucketing, "2024-13-01").is_err());
    }

    #[test]
    fn periods_end_today() {
        let bucketing = DateBucketing::new(Utc);

        let week = parse_range(&bucketing, &input(None, None, None), &now()).unwrap();
        assert_eq!(
            keys(&bucketing, &week),
            ("2024-03-09".to_string(), "2024-03-15".to_string())
        );

        let today = parse_range(&bucketing, &input(None, None, Some("today")), &now()).unwrap();
        assert_eq!(today.start, today.end);

        assert_eq!(
            parse_range(&bucketing, &input(None, None, Some("year")), &now()),
            Err(MalformedInputError::Period("year".to_string()))
        );
    }
}
