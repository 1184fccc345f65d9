//! Error taxonomy for the symptom checker.
//!
//! Every variant carries the alert text shown to the user via
//! [`CheckerError::user_message`]. Failures never mutate session state.

use thiserror::Error;

use crate::session::Phase;

/// Input rejected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Symptom text was empty or whitespace only.
    #[error("Please enter your symptoms")]
    EmptySymptoms,

    /// Final analysis requested with no follow-up question checked.
    #[error("Please select at least one follow-up symptom")]
    NoFollowUpSelected,

    /// Toggle referenced a question index the current analysis does not have.
    #[error("No follow-up question at position {index}")]
    UnknownQuestion {
        /// Requested checkbox index.
        index: usize,
    },
}

/// Which service exchange an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// `POST /analyze`.
    Initial,
    /// `POST /final_analysis`.
    Final,
}

impl Exchange {
    /// Path of the endpoint on the analysis service.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Initial => "analyze",
            Self::Final => "final_analysis",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Errors raised while talking to the analysis service.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failure, timeout or body read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid service URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not a valid service envelope.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, if readable.
        message: String,
    },
}

/// Top-level checker error.
#[derive(Error, Debug)]
pub enum CheckerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The exchange failed in transit.
    #[error("{exchange} request failed: {source}")]
    Transport {
        exchange: Exchange,
        #[source]
        source: TransportError,
    },

    /// The service answered but reported a status other than `"success"`.
    #[error("{exchange} returned status {status:?}")]
    Service { exchange: Exchange, status: String },

    /// Operation not available in the session's current phase.
    #[error("{operation} is not available while {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    /// Another request for the same session is still in flight.
    #[error("an analysis is already in progress for this session")]
    Busy,

    /// The page refers to a session the store no longer holds.
    #[error("session is unknown or has expired")]
    SessionExpired,
}

impl CheckerError {
    /// Wrap a transport failure for `exchange`.
    #[must_use]
    pub fn transport(exchange: Exchange, source: TransportError) -> Self {
        Self::Transport { exchange, source }
    }

    /// Alert text shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Transport {
                exchange: Exchange::Initial,
                ..
            } => "An error occurred while analyzing symptoms".to_string(),
            Self::Transport {
                exchange: Exchange::Final,
                ..
            } => "An error occurred while performing final analysis".to_string(),
            Self::Service { status, .. } => {
                format!("The analysis service could not complete the request (status: {status})")
            }
            Self::InvalidTransition { .. } => {
                "That action is not available right now. Start a new analysis.".to_string()
            }
            Self::Busy => "Please wait for the current analysis to finish".to_string(),
            Self::SessionExpired => {
                "Your session has expired. Please start a new analysis.".to_string()
            }
        }
    }

    /// Whether the error was caused by user input rather than the service.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for checker operations.
pub type Result<T> = std::result::Result<T, CheckerError>;
