//! Response classification.

use serde_json::Value;

use crate::http_client::ApiResponse;
use crate::models::ResultPayload;

/// What a received response means for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified<P> {
    /// HTTP 429, with the server's `error` text when it sent one.
    Throttled { server_message: Option<String> },
    /// Unexpected status or unreadable body. The detail is for logs only.
    Failed(String),
    /// 2xx carrying an `error` field.
    ApplicationError(String),
    /// 2xx with nothing to render, with the server's message if any.
    Empty(Option<String>),
    Success(P),
}

/// Classify a response. Checks run in a fixed order: throttling, status,
/// body shape, `error` field, emptiness.
pub fn classify<P: ResultPayload>(response: &ApiResponse) -> Classified<P> {
    if response.is_throttled() {
        return Classified::Throttled {
            server_message: response.error_message(),
        };
    }

    if !response.is_success() {
        return Classified::Failed(format!("HTTP {}", response.status.as_u16()));
    }

    let body: Value = match response.json() {
        Ok(body) => body,
        Err(e) => return Classified::Failed(format!("invalid JSON body: {}", e)),
    };

    match body.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) => return Classified::ApplicationError(message.clone()),
        Some(other) => return Classified::ApplicationError(other.to_string()),
    }

    let payload: P = match serde_json::from_value(body) {
        Ok(payload) => payload,
        Err(e) => return Classified::Failed(format!("unexpected body shape: {}", e)),
    };

    if payload.is_empty() {
        return Classified::Empty(payload.message().map(str::to_string));
    }

    Classified::Success(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatesPayload, InsightsPayload};
    use reqwest::StatusCode;

    fn response(status: StatusCode, body: &str) -> ApiResponse {
        ApiResponse::new(status, body)
    }

    #[test]
    fn test_throttle_wins_over_body() {
        let classified: Classified<DatesPayload> = classify(&response(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": "Rate limit exceeded: 10 per 12 hours"}"#,
        ));
        assert_eq!(
            classified,
            Classified::Throttled {
                server_message: Some("Rate limit exceeded: 10 per 12 hours".to_string())
            }
        );

        let bare: Classified<DatesPayload> =
            classify(&response(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"));
        assert_eq!(bare, Classified::Throttled { server_message: None });
    }

    #[test]
    fn test_non_success_is_failure_even_with_error_body() {
        let classified: Classified<DatesPayload> = classify(&response(
            StatusCode::NOT_FOUND,
            r#"{"error": "No dates available for XYZ"}"#,
        ));
        assert!(matches!(classified, Classified::Failed(_)));
    }

    #[test]
    fn test_error_field_on_success() {
        let classified: Classified<DatesPayload> = classify(&response(
            StatusCode::OK,
            r#"{"error": "Invalid gap data format"}"#,
        ));
        assert_eq!(
            classified,
            Classified::ApplicationError("Invalid gap data format".to_string())
        );
    }

    #[test]
    fn test_empty_and_success() {
        let empty: Classified<DatesPayload> = classify(&response(
            StatusCode::OK,
            r#"{"dates": [], "message": "No gaps found for the selected criteria"}"#,
        ));
        assert_eq!(
            empty,
            Classified::Empty(Some("No gaps found for the selected criteria".to_string()))
        );

        let no_insights: Classified<InsightsPayload> =
            classify(&response(StatusCode::OK, r#"{"insights": {}}"#));
        assert_eq!(no_insights, Classified::Empty(None));

        let dates: Classified<DatesPayload> =
            classify(&response(StatusCode::OK, r#"{"dates": ["2024-01-08"]}"#));
        assert!(matches!(dates, Classified::Success(p) if p.dates.len() == 1));
    }

    #[test]
    fn test_garbage_body_is_failure() {
        let classified: Classified<DatesPayload> =
            classify(&response(StatusCode::OK, "<html>proxy error</html>"));
        assert!(matches!(classified, Classified::Failed(_)));

        let wrong_shape: Classified<DatesPayload> =
            classify(&response(StatusCode::OK, r#"{"dates": "soon"}"#));
        assert!(matches!(wrong_shape, Classified::Failed(_)));
    }
}
