use thiserror::Error;

/// Failures surfaced by the lifecycle layer.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The exchange-facing port failed.
    #[error("provider error: {0}")]
    Provider(String),
}
