//! Error types for hpcount-core

/// Result type alias for hpcount operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
///
/// Every variant is a per-request failure: the frame that produced it must
/// not be acted on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Envelope is missing a mandatory field or carries bad hex
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Block size does not match the frame's fixed size
    #[error("Wrong length for {frame}: expected {expected} bytes, got {actual} bytes")]
    WrongLength {
        frame: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Checksum verification failed
    #[error("Checksum mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        expected: u16,
        received: u16,
    },

    /// Declared `count` disagrees with the number of data blocks
    #[error("Count mismatch: declared {declared}, got {actual} data blocks")]
    CountMismatch {
        declared: u16,
        actual: usize,
    },

    /// Checksummed span exceeds the protocol ceiling
    #[error("Checksum span too long: {size} bytes (max: {max} bytes)")]
    ChecksumSpanTooLong {
        size: usize,
        max: usize,
    },

    /// Command the device is not known to send
    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    /// Timestamp cannot be represented on the wire or read back from it
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl Error {
    /// Check if the frame arrived damaged (truncated or corrupted bytes)
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::WrongLength { .. } | Self::ChecksumMismatch { .. } | Self::CountMismatch { .. }
        )
    }
}
