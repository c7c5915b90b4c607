use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stride_model::StepSample;

use crate::error::{AuthorizationError, QueryError};
use crate::gateway::HealthStore;

/// A health store backed by an in-memory sample list.
///
/// Failures can be scripted per window start so callers can check how they
/// degrade when part of a range cannot be read.
#[derive(Debug, Default)]
pub struct MemoryHealthStore {
    samples: Vec<StepSample>,
    denied: bool,
    failing_windows: Mutex<Vec<DateTime<Utc>>>,
    queries: AtomicUsize,
}

impl MemoryHealthStore {
    pub fn new(samples: Vec<StepSample>) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }

    /// A store that refuses read authorization.
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    /// Make the query whose window starts at `window_start` fail.
    pub fn fail_window(&self, window_start: DateTime<Utc>) {
        if let Ok(mut windows) = self.failing_windows.lock() {
            windows.push(window_start);
        }
    }

    /// Number of queries issued so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn select(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<StepSample> {
        self.samples
            .iter()
            .filter(|s| s.in_window(start, end))
            .cloned()
            .collect()
    }

    fn should_fail(&self, window_start: DateTime<Utc>) -> bool {
        self.failing_windows
            .lock()
            .map(|windows| windows.contains(&window_start))
            .unwrap_or(false)
    }
}

#[async_trait]
impl HealthStore for MemoryHealthStore {
    async fn request_read_authorization(&self) -> Result<(), AuthorizationError> {
        if self.denied {
            return Err(AuthorizationError::Denied(self.data_type().label()));
        }
        Ok(())
    }

    async fn query_step_samples(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<StepSample>, QueryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.denied {
            return Err(QueryError::Unauthorized);
        }
        if self.should_fail(window_start) {
            return Err(QueryError::Store(format!(
                "scripted failure for window starting {}",
                window_start.to_rfc3339()
            )));
        }

        Ok(self.select(window_start, window_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn query_uses_strict_start_window() {
        let store = MemoryHealthStore::new(vec![
            StepSample::new(at(5, 0), 1.0),
            StepSample::new(at(5, 59), 2.0),
            StepSample::new(at(6, 0), 4.0),
        ]);

        let samples = store.query_step_samples(at(5, 0), at(6, 0)).await.unwrap();
        let total: f64 = samples.iter().map(|s| s.quantity).sum();

        assert_eq!(samples.len(), 2);
        assert_eq!(total, 3.0);
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn scripted_window_fails_others_succeed() {
        let store = MemoryHealthStore::new(vec![StepSample::new(at(7, 10), 8.0)]);
        store.fail_window(at(5, 0));

        assert!(matches!(
            store.query_step_samples(at(5, 0), at(6, 0)).await,
            Err(QueryError::Store(_))
        ));
        assert_eq!(
            store.query_step_samples(at(7, 0), at(8, 0)).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn denied_store_rejects_authorization_and_queries() {
        let store = MemoryHealthStore::denied();

        assert_eq!(
            store.request_read_authorization().await,
            Err(AuthorizationError::Denied("Step Count"))
        );
        assert_eq!(
            store.query_step_samples(at(0, 0), at(1, 0)).await,
            Err(QueryError::Unauthorized)
        );
    }
}
