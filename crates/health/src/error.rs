/// Errors returned when read access to the health store is requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("Read access to {0} was denied")]
    Denied(&'static str),

    #[error("Health data is unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by a single sample query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Not authorized to read health data")]
    Unauthorized,

    #[error("Store error: {0}")]
    Store(String),
}
