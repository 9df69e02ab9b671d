//! Mapping HTTP failures onto [`BackendError`].

use serde::Deserialize;

use wordquiz_core::BackendError;

/// Error payload the backend sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Pull the optional `message` field out of an error body.
///
/// Bodies that are not JSON, or JSON without a string `message`, yield `None`.
pub(crate) fn payload_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}

/// Classify a non-2xx response.
pub(crate) fn from_status(status: u16, body: &str) -> BackendError {
    let message = payload_message(body);
    if status == 401 {
        BackendError::Unauthorized { message }
    } else {
        BackendError::Api { status, message }
    }
}

/// Classify a transport-level failure.
pub(crate) fn from_transport(e: &reqwest::Error, timeout_secs: u64) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout(timeout_secs)
    } else {
        BackendError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_extracted_from_json_body() {
        assert_eq!(
            payload_message(r#"{"message": "Token has expired", "error_type": "TokenExpired"}"#),
            Some("Token has expired".to_string())
        );
    }

    #[test]
    fn non_json_or_missing_message_is_none() {
        assert_eq!(payload_message("<html>502 Bad Gateway</html>"), None);
        assert_eq!(payload_message(r#"{"error": "boom"}"#), None);
        assert_eq!(payload_message(r#"{"message": ""}"#), None);
        assert_eq!(payload_message(""), None);
    }

    #[test]
    fn unauthorized_status_classified() {
        let err = from_status(401, r#"{"message": "Invalid token"}"#);
        assert_eq!(
            err,
            BackendError::Unauthorized {
                message: Some("Invalid token".into())
            }
        );

        let err = from_status(500, "oops");
        assert_eq!(
            err,
            BackendError::Api {
                status: 500,
                message: None
            }
        );
    }
}
