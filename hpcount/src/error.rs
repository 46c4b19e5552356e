//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Core(#[from] hpcount_core::Error),

    #[error("Configuration error: {0}")]
    Types(#[from] hpcount_types::Error),

    #[error("Unexpected request: {0}")]
    UnexpectedRequest(String),
}

impl Error {
    /// True when the request was damaged in transit (size, checksum, count)
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_integrity_failure())
    }
}
