//! Error types for timers, namespaces and their codecs
//!
//! Encoding and decoding failures are kept in separate families so callers
//! can tell a value that could not be written apart from bytes that could not
//! be read. Both convert into the umbrella [`TimerError`].

use thiserror::Error;

use crate::time::{TimeDomain, Timestamp};

/// Main error type for the timer subsystem
#[derive(Error, Debug)]
pub enum TimerError {
    /// A value could not be serialized
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Bytes could not be turned back into a value
    #[error("decoding error: {0}")]
    Decoding(#[from] DecodingError),

    /// Window construction errors
    #[error("window error: {0}")]
    Window(#[from] WindowError),

    /// A clock was asked to move backwards
    #[error("clock regression in {domain}: new time {new_time} is before current {current_time}")]
    ClockRegression {
        domain: TimeDomain,
        current_time: Timestamp,
        new_time: Timestamp,
    },

    /// Configuration errors
    #[error("configuration error: {source}")]
    Configuration {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Serialization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The nested window coder rejected the window value
    #[error("window could not be encoded: {source}")]
    Window {
        #[source]
        source: Box<EncodingError>,
    },

    /// A value cannot be represented by the wire format
    #[error("cannot encode {what}: {reason}")]
    Unrepresentable { what: &'static str, reason: String },

    /// A length exceeds the configured limit
    #[error("{what} length {len} exceeds limit {limit}")]
    LimitExceeded {
        what: &'static str,
        len: usize,
        limit: usize,
    },
}

/// Deserialization failures
///
/// The decoder never recovers partially: any of these means no value was
/// produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodingError {
    /// Input ended before a value was complete
    #[error("unexpected end of input while reading {what}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        what: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// Discriminator byte outside the known range
    #[error("invalid {what} discriminator: {value}")]
    InvalidDiscriminator { what: &'static str, value: u8 },

    /// Declared length prefix runs past the end of the input
    #[error("declared length {declared} of {what} exceeds remaining input {remaining}")]
    LengthOutOfBounds {
        what: &'static str,
        declared: u64,
        remaining: usize,
    },

    /// Declared length or count exceeds the configured limit
    #[error("declared {what} length {declared} exceeds limit {limit}")]
    LimitExceeded {
        what: &'static str,
        declared: u64,
        limit: usize,
    },

    /// Varint did not terminate within 10 bytes or overflowed 64 bits
    #[error("varint overflows 64 bits")]
    VarintOverflow,

    /// Bytes were not valid UTF-8
    #[error("invalid UTF-8 in {what}: {reason}")]
    InvalidUtf8 { what: &'static str, reason: String },

    /// Namespace string key is malformed
    #[error("malformed namespace key '{key}': {reason}")]
    InvalidNamespaceKey { key: String, reason: String },

    /// Decoded fields describe an impossible value
    #[error("invalid {what}: {reason}")]
    InvalidValue { what: &'static str, reason: String },

    /// The nested window coder rejected its payload
    #[error("window payload could not be decoded: {source}")]
    Window {
        #[source]
        source: Box<DecodingError>,
    },

    /// Input continued after a complete value
    #[error("{remaining} trailing bytes after complete value")]
    TrailingBytes { remaining: usize },
}

/// Window construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// Window start is after its end
    #[error("invalid window bounds: start {start} is after end {end}")]
    InvalidBounds { start: Timestamp, end: Timestamp },
}

/// Result type alias for timer operations
pub type Result<T> = std::result::Result<T, TimerError>;

/// Result type alias for encode operations
pub type EncodeResult<T> = std::result::Result<T, EncodingError>;

/// Result type alias for decode operations
pub type DecodeResult<T> = std::result::Result<T, DecodingError>;

/// Result type alias for window operations
pub type WindowResult<T> = std::result::Result<T, WindowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding_error_display() {
        let err = DecodingError::UnexpectedEof {
            what: "timestamp",
            needed: 8,
            remaining: 3,
        };
        assert!(err.to_string().contains("unexpected end of input"));
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_window_decoding_error_keeps_source() {
        use std::error::Error as _;

        let err = DecodingError::Window {
            source: Box::new(DecodingError::VarintOverflow),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_clock_regression_display() {
        let err = TimerError::ClockRegression {
            domain: TimeDomain::EventTime,
            current_time: Timestamp::from_millis(1000),
            new_time: Timestamp::from_millis(900),
        };
        assert!(err.to_string().contains("clock regression"));
        assert!(err.to_string().contains("EVENT_TIME"));
    }

    #[test]
    fn test_timer_error_from_decoding_error() {
        let err: TimerError = DecodingError::VarintOverflow.into();
        assert!(matches!(err, TimerError::Decoding(_)));
    }
}
