//! Error types.
//!
//! Configuration problems are reported once, when a representation is built.
//! Per-event operations never fail: out-of-bounds events are dropped and
//! out-of-order timestamps only degrade the decay computation.

use crate::config::ChannelKind;

/// Errors raised while validating a configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("grid dimensions {width}x{height} exceed the maximum of {max}")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },

    #[error("vector channel width must be between 2 and {max}, got {width}")]
    InvalidChannels { width: usize, max: usize },

    #[error("polarity split needs exactly two channels, got {0:?}")]
    PolarityNeedsTwoChannels(ChannelKind),

    #[error("decay constant tau must be positive and finite, got {0}")]
    InvalidTau(f64),

    #[error("capacity must be between 1 and {max} elements, got {capacity}")]
    InvalidCapacity { capacity: usize, max: usize },

    #[error("scale factor must be finite, got {0}")]
    InvalidScale(f64),

    #[error("invalid extent: {0}")]
    InvalidExtent(String),

    #[error("remap table has {actual} entries, expected {expected}")]
    InvalidRemapTable { expected: usize, actual: usize },
}

/// Errors raised while reading events from a text stream.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: expected {expected} columns, found {found}")]
    MissingColumn {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Convenience alias for configuration results.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
