//! Gateway trait between the aggregator and a health data store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stride_model::{HealthDataType, StepSample};

use crate::error::{AuthorizationError, QueryError};

/// Read-only access to step-count samples.
///
/// Callers must resolve [`request_read_authorization`] before issuing
/// queries. Implementations are not required to enforce that ordering.
///
/// [`request_read_authorization`]: HealthStore::request_read_authorization
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// The single data type this store is asked to read.
    fn data_type(&self) -> HealthDataType {
        HealthDataType::StepCount
    }

    /// Request read scope for [`HealthStore::data_type`]. Write scope is
    /// never requested.
    async fn request_read_authorization(&self) -> Result<(), AuthorizationError>;

    /// All samples whose own start lies in `[window_start, window_end)`.
    async fn query_step_samples(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<StepSample>, QueryError>;
}
