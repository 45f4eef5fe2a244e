//! Error types for the tuner.

use thiserror::Error;

/// Result type for tuner operations.
pub type Result<T> = std::result::Result<T, TunerError>;

/// Errors that can occur while configuring or running the tuner.
///
/// There is no "no pitch" error: silence and noise produce the `?` status.
#[derive(Debug, Error)]
pub enum TunerError {
    /// The capture block cannot hold two detection windows.
    #[error(
        "detection length {detection} needs a capture length of at least {required}, got {capture}"
    )]
    BufferTooLarge {
        /// Configured detection buffer length.
        detection: usize,
        /// Configured capture block length.
        capture: usize,
        /// Smallest capture length that would be accepted.
        required: usize,
    },

    /// The detection buffer is too short for threshold search and interpolation.
    #[error("detection length must be at least 3, got {0}")]
    BufferTooSmall(usize),

    /// Invalid sample rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// A frequency that cannot be mapped to a note.
    #[error("invalid frequency: {freq} Hz")]
    InvalidFrequency {
        /// The invalid frequency.
        freq: f64,
    },

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The audio source failed to deliver a block.
    #[error("audio source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The audio source has no more blocks.
    #[error("audio source reached end of stream")]
    EndOfStream,

    /// The background detection thread panicked.
    #[error("detection worker panicked")]
    WorkerPanicked,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TunerError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Wraps a collaborator's error as a source failure.
    pub fn source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Source(Box::new(err))
    }
}
