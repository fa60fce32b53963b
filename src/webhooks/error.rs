//! Error types for admission review decisions.
//!
//! Every variant is a client error: the request reached us but cannot be
//! judged. Policy denials are not errors and live in `Verdict::Denied`.

use std::fmt;
use thiserror::Error;

/// HTTP-style status code attached to client-error verdicts
pub const BAD_REQUEST: u16 = 400;

/// Reasons a review request could not be evaluated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// Request targets a group other than the one this webhook guards
    #[error("group is not {expected}")]
    GroupMismatch { expected: String, actual: String },

    /// Kind is outside the supported set (or disabled by configuration)
    #[error("kind is not supported: {0}")]
    UnsupportedKind(String),

    /// Old or new object payload did not decode into the kind's shape
    #[error("object decode error")]
    Decode(DecodeFailure),
}

impl ReviewError {
    /// Status code reported back to the API server
    pub fn status_code(&self) -> u16 {
        match self {
            ReviewError::GroupMismatch { .. }
            | ReviewError::UnsupportedKind(_)
            | ReviewError::Decode(_) => BAD_REQUEST,
        }
    }
}

/// Individual decode failures for the two snapshots of one request.
///
/// At least one side is set when this is returned from a decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Failure decoding `oldObject`
    pub old: Option<String>,
    /// Failure decoding `object`
    pub new: Option<String>,
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.old, &self.new) {
            (Some(old), Some(new)) => write!(f, "oldObject: {}; object: {}", old, new),
            (Some(old), None) => write!(f, "oldObject: {}", old),
            (None, Some(new)) => write!(f, "object: {}", new),
            (None, None) => write!(f, "no decode failure"),
        }
    }
}
