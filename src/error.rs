//! Error types for the compression pipeline.

use thiserror::Error;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the compression pipeline.
///
/// Consistency errors ([`Error::MissingCode`], [`Error::TruncatedBitstream`])
/// indicate a bug inside the pipeline rather than bad input, and are kept
/// separate from input-level errors so callers can tell the two apart.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid worker configuration, rejected before any worker starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The input sequence is empty; no frequency table or tree can be built.
    #[error("empty input: nothing to compress")]
    EmptyInput,

    /// Underlying I/O failure (unreadable input, unwritable output, thread
    /// spawn failure).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker thread died before completing its phase.
    #[error("worker failure: {0}")]
    Worker(String),

    /// An encoder worker met a byte with no codebook entry.
    #[error("internal consistency error: no code for symbol {0:#04x}")]
    MissingCode(u8),

    /// A decode walk ended mid-path instead of on a leaf.
    #[error("internal consistency error: bitstream ends off a leaf")]
    TruncatedBitstream,

    /// The padding header of a packed bitstream is out of range.
    #[error("invalid bitstream header: padding count {0} exceeds 7")]
    InvalidHeader(u8),
}
