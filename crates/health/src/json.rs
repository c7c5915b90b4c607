use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stride_model::StepSample;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{AuthorizationError, QueryError};
use crate::gateway::HealthStore;
use crate::memory::MemoryHealthStore;

/// A health store reading an exported JSON array of step samples.
///
/// The export is read once, on the first authorization request or query,
/// and served from memory afterwards.
pub struct JsonHealthStore {
    path: PathBuf,
    authorized: bool,
    loaded: OnceCell<MemoryHealthStore>,
}

impl JsonHealthStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            authorized: true,
            loaded: OnceCell::new(),
        }
    }

    /// Whether the user has granted read access to the export.
    pub fn with_authorized(mut self, authorized: bool) -> Self {
        self.authorized = authorized;
        self
    }

    async fn load(&self) -> Result<&MemoryHealthStore, String> {
        self.loaded
            .get_or_try_init(|| async {
                let content = tokio::fs::read_to_string(&self.path)
                    .await
                    .map_err(|e| format!("{}: {}", self.path.display(), e))?;
                let samples: Vec<StepSample> = serde_json::from_str(&content)
                    .map_err(|e| format!("{}: {}", self.path.display(), e))?;
                debug!(path = ?self.path, count = samples.len(), "Loaded step samples");
                Ok(MemoryHealthStore::new(samples))
            })
            .await
    }
}

#[async_trait]
impl HealthStore for JsonHealthStore {
    async fn request_read_authorization(&self) -> Result<(), AuthorizationError> {
        if !self.authorized {
            return Err(AuthorizationError::Denied(self.data_type().label()));
        }
        self.load().await.map_err(AuthorizationError::Unavailable)?;
        Ok(())
    }

    async fn query_step_samples(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<StepSample>, QueryError> {
        if !self.authorized {
            return Err(QueryError::Unauthorized);
        }
        let store = self.load().await.map_err(QueryError::Store)?;
        Ok(store.select(window_start, window_end))
    }
}
