use std::sync::Arc;

use thiserror::Error;

/// Terminal failure of a flushed batch.
///
/// The same value is delivered to every subscriber of the batch, hence the
/// shared causes.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(
        "Deadline exceeded before the transaction was submitted! Batch \
        discarded."
    )]
    DeadlineExceeded,
    #[error("Failed to build transaction! Cause: {0:#}")]
    Build(Arc<anyhow::Error>),
    #[error("Failed to sign transaction! Cause: {0:#}")]
    Signing(Arc<anyhow::Error>),
    #[error("Failed to encode transaction! Cause: {0:#}")]
    Encoding(Arc<anyhow::Error>),
    #[error("Failed to communicate with the node! Cause: {0:#}")]
    Transport(Arc<anyhow::Error>),
}

impl Error {
    #[must_use]
    pub fn build(error: anyhow::Error) -> Self {
        Self::Build(Arc::new(error))
    }

    #[must_use]
    pub fn signing(error: anyhow::Error) -> Self {
        Self::Signing(Arc::new(error))
    }

    #[must_use]
    pub fn encoding(error: anyhow::Error) -> Self {
        Self::Encoding(Arc::new(error))
    }

    #[must_use]
    pub fn transport(error: anyhow::Error) -> Self {
        Self::Transport(Arc::new(error))
    }

    #[must_use]
    pub const fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }
}
