//! Error handling for the Lilly client.
//!
//! Only transport-level failures surface as errors. Malformed payloads,
//! split code points and empty frames are absorbed by the stream engine and
//! never reach this type.

use std::time::Duration;
use thiserror::Error;

use crate::traits::HttpError;

/// Fixed notice shown in place of an assistant reply that failed mid-stream.
pub const STREAM_FAILURE_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

/// Error type for Lilly client operations.
#[derive(Debug, Error)]
pub enum LillyError {
    /// HTTP transport failed (connect, read, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Server answered with a non-success status
    #[error("Lilly API error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// No chunk arrived within the configured idle timeout
    #[error("Stream idle for more than {after:?}")]
    IdleTimeout { after: Duration },

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LillyError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            LillyError::Http(HttpError::ConnectionFailed(_)) => {
                "Could not reach the Lilly service. Is the backend running?".to_string()
            }
            LillyError::Http(HttpError::Timeout(_)) | LillyError::IdleTimeout { .. } => {
                "The Lilly service stopped responding.".to_string()
            }
            LillyError::ServerError { status, .. } => {
                format!("The Lilly service returned an error ({}).", status)
            }
            _ => STREAM_FAILURE_NOTICE.to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            LillyError::Http(_) => "E_LILLY_HTTP",
            LillyError::ServerError { .. } => "E_LILLY_STATUS",
            LillyError::IdleTimeout { .. } => "E_LILLY_IDLE",
            LillyError::Json(_) => "E_LILLY_JSON",
        }
    }
}

/// Type alias for Results using LillyError.
pub type LillyResult<T> = Result<T, LillyError>;
