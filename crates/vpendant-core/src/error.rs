//! Error handling for vpendant
//!
//! Provides the error types shared by every layer of the pendant:
//! - Validation errors (bad step size, unknown axis or mode)
//! - Transport errors (network or HTTP failures on a send)
//!
//! All error types use `thiserror` for ergonomic error handling.
//! Calling `stop()` on an idle session is a no-op and has no error variant.

use thiserror::Error;

use crate::data::{MAX_STEP, MIN_STEP};

/// Validation error type
///
/// Returned synchronously to the caller of `start` and never changes
/// session state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Step size outside the accepted range
    #[error("Step size {step} out of range [{min}, {max}]")]
    StepOutOfRange {
        /// The rejected step size.
        step: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// Axis name not known for the selected mode
    #[error("Unknown axis '{axis}' for {mode} mode")]
    UnknownAxis {
        /// The axis name that was not found.
        axis: String,
        /// The mode the lookup was made in.
        mode: String,
    },

    /// Jog mode name not recognised
    #[error("Unknown jog mode: {mode}")]
    UnknownMode {
        /// The unrecognised mode name.
        mode: String,
    },

    /// Jog direction name not recognised
    #[error("Unknown jog direction: {direction}")]
    UnknownDirection {
        /// The unrecognised direction name.
        direction: String,
    },
}

impl ValidationError {
    /// Build the out-of-range error for a step value
    pub fn step_out_of_range(step: f64) -> Self {
        ValidationError::StepOutOfRange {
            step,
            min: MIN_STEP,
            max: MAX_STEP,
        }
    }
}

/// Transport error type
///
/// Reported asynchronously through the event bus. A failed send never
/// ends a jog session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Request could not reach the pendant backend
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network failure.
        reason: String,
    },

    /// Backend answered with a non-success HTTP status
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Backend answered but reported the command as failed
    #[error("Command rejected: {message}")]
    Rejected {
        /// Message returned by the backend.
        message: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response: {reason}")]
    Decode {
        /// The reason decoding failed.
        reason: String,
    },

    /// Base URL is not usable
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },

    /// Request was dropped before completing
    #[error("Request cancelled")]
    Cancelled,
}

/// Main error type for vpendant
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a transport error
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
