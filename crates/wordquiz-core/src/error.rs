//! Error types.
//!
//! [`BackendError`] describes a failed call to the quiz backend and is defined
//! here so the controller can pull the server's message out of it without
//! string matching. [`QuizError`] is what controller operations return.

use thiserror::Error;

/// Toast text when a fetch fails and the server sent no message.
pub const FETCH_FALLBACK_MESSAGE: &str = "Failed to load question";
/// Toast text when a submission fails and the server sent no message.
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Failed to submit answer";

/// Errors that can occur when talking to the quiz backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend rejected the session token (HTTP 401).
    #[error("unauthorized: {}", .message.as_deref().unwrap_or("no message"))]
    Unauthorized { message: Option<String> },

    /// The backend returned a non-2xx response.
    #[error("API error (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A transport-level failure (connection refused, DNS, TLS...).
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// The `message` field of the error payload, if the server sent one.
    pub fn payload_message(&self) -> Option<&str> {
        match self {
            BackendError::Unauthorized { message } | BackendError::Api { message, .. } => {
                message.as_deref().filter(|m| !m.is_empty())
            }
            _ => None,
        }
    }

    /// The server's message, or `fallback` when there is none.
    pub fn user_message(&self, fallback: &str) -> String {
        self.payload_message().unwrap_or(fallback).to_string()
    }

    /// Whether the session token was refused.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Unauthorized { .. })
    }
}

/// How loudly an error should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Errors returned by [`crate::controller::QuizController`] operations.
///
/// Every variant except `Fetch` and `Submit` is raised before any network call
/// and leaves the quiz state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("no option selected")]
    NoOptionSelected,

    #[error("missing question id, reload the question")]
    MissingQuestion,

    #[error("'{0}' is not one of the options")]
    UnknownOption(String),

    #[error("this question has already been answered")]
    AlreadyAnswered,

    #[error("a request is already in flight")]
    Busy,

    #[error("not signed in")]
    NotAuthenticated,

    /// A newer fetch replaced the question this result belonged to.
    #[error("superseded by a newer question")]
    Superseded,

    #[error("fetching question failed: {0}")]
    Fetch(BackendError),

    #[error("submitting answer failed: {0}")]
    Submit(BackendError),
}

impl QuizError {
    pub fn severity(&self) -> Severity {
        match self {
            QuizError::NoOptionSelected | QuizError::Busy | QuizError::Superseded => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// Text suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            QuizError::Fetch(e) => e.user_message(FETCH_FALLBACK_MESSAGE),
            QuizError::Submit(e) => e.user_message(SUBMIT_FALLBACK_MESSAGE),
            QuizError::NoOptionSelected => "Please select an option".to_string(),
            other => {
                let mut msg = other.to_string();
                if let Some(first) = msg.get_mut(..1) {
                    first.make_ascii_uppercase();
                }
                msg
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_message_preferred_over_fallback() {
        let err = BackendError::Api {
            status: 500,
            message: Some("Internal server error".into()),
        };
        assert_eq!(err.user_message("fallback"), "Internal server error");
        assert_eq!(
            QuizError::Fetch(err).user_message(),
            "Internal server error"
        );
    }

    #[test]
    fn fallback_when_no_payload() {
        let err = BackendError::Network("connection refused".into());
        assert_eq!(
            QuizError::Fetch(err.clone()).user_message(),
            FETCH_FALLBACK_MESSAGE
        );
        assert_eq!(QuizError::Submit(err).user_message(), SUBMIT_FALLBACK_MESSAGE);

        let empty = BackendError::Api {
            status: 502,
            message: Some(String::new()),
        };
        assert_eq!(empty.payload_message(), None);
    }

    #[test]
    fn severity_classification() {
        assert_eq!(QuizError::NoOptionSelected.severity(), Severity::Warning);
        assert_eq!(QuizError::MissingQuestion.severity(), Severity::Error);
        assert_eq!(
            QuizError::Submit(BackendError::Timeout(30)).severity(),
            Severity::Error
        );
    }

    #[test]
    fn validation_messages_are_capitalized() {
        assert_eq!(
            QuizError::MissingQuestion.user_message(),
            "Missing question id, reload the question"
        );
        assert_eq!(QuizError::NoOptionSelected.user_message(), "Please select an option");
    }

    #[test]
    fn unauthorized_display() {
        let err = BackendError::Unauthorized {
            message: Some("Token has expired".into()),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "unauthorized: Token has expired");
    }
}
