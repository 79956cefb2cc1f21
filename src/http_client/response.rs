//! HTTP response wrapper.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Body shape the API uses for every error, including 429.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A fully read API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the server asked us to slow down.
    pub fn is_throttled(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// The `error` field of the body, if it has one.
    pub fn error_message(&self) -> Option<String> {
        self.json::<ErrorBody>().ok().map(|b| b.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_throttle_body() {
        let response = ApiResponse::new(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": "Rate limit exceeded: 10 per 12 hours"}"#,
        );
        assert!(response.is_throttled());
        assert!(!response.is_success());
        assert_eq!(
            response.error_message().as_deref(),
            Some("Rate limit exceeded: 10 per 12 hours")
        );
    }

    #[test]
    fn test_error_message_absent_for_plain_body() {
        let response = ApiResponse::new(StatusCode::OK, r#"{"dates": []}"#);
        assert_eq!(response.error_message(), None);

        let html = ApiResponse::new(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(html.error_message(), None);
    }
}
