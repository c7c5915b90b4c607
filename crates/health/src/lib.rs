//! Health data store access for stride.
//!
//! This crate defines the [`HealthStore`] trait that the step aggregator
//! queries, plus the store implementations shipped with the CLI.
//!
//! # Stores
//!
//! - [`MemoryHealthStore`] - samples held in memory, with scripted failures
//! - [`JsonHealthStore`] - samples loaded from an exported JSON file
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stride_health::{HealthStore, JsonHealthStore};
//!
//! let store: Arc<dyn HealthStore> = Arc::new(JsonHealthStore::new("steps.json"));
//! store.request_read_authorization().await?;
//! let samples = store.query_step_samples(start, end).await?;
//! ```

mod error;
mod gateway;
mod json;
mod memory;

pub use error::{AuthorizationError, QueryError};
pub use gateway::HealthStore;
pub use json::JsonHealthStore;
pub use memory::MemoryHealthStore;
