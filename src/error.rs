use thiserror::Error;

/// Key/value store failures. Always absorbed fail-open by the verdict
/// cache: a read error is a miss, a write error is a no-op.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt cache payload: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Faults in the orchestration itself. Sub-stage failures (oracle,
/// retrieval backends, cache) never produce one of these; they degrade
/// locally to documented fallback values.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline fault: {0}")]
    Internal(String),
}
