//! Query inputs and outcomes.

use serde::{Deserialize, Serialize};

/// Named string parameters for one action, in the order they were set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    params: Vec<(String, String)>,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`QueryRequest::set`].
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a parameter, replacing any earlier value under the same name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a parameter when it is set to something other than blanks.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    /// Required names that are absent or blank.
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| self.value(name).is_none())
            .collect()
    }

    /// Non-blank parameters, for the query string.
    pub fn params(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.params.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// Result of one pipeline invocation. Exactly one per submission.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<P> {
    /// A required selection was empty; nothing was sent.
    MissingSelection(String),
    Success(P),
    EmptyResult(String),
    ApplicationError(String),
    Throttled { reset_at_ms: i64, message: String },
    TransportError(String),
}

/// Payload-free tag of a [`QueryOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    MissingSelection,
    Success,
    EmptyResult,
    ApplicationError,
    Throttled,
    TransportError,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingSelection => "missing_selection",
            Self::Success => "success",
            Self::EmptyResult => "empty_result",
            Self::ApplicationError => "application_error",
            Self::Throttled => "throttled",
            Self::TransportError => "transport_error",
        }
    }
}

impl<P> QueryOutcome<P> {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::MissingSelection(_) => OutcomeKind::MissingSelection,
            Self::Success(_) => OutcomeKind::Success,
            Self::EmptyResult(_) => OutcomeKind::EmptyResult,
            Self::ApplicationError(_) => OutcomeKind::ApplicationError,
            Self::Throttled { .. } => OutcomeKind::Throttled,
            Self::TransportError(_) => OutcomeKind::TransportError,
        }
    }

    /// The rendered message for every outcome except success.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::MissingSelection(m)
            | Self::EmptyResult(m)
            | Self::ApplicationError(m)
            | Self::TransportError(m) => Some(m),
            Self::Throttled { message, .. } => Some(message),
        }
    }

    pub fn payload(&self) -> Option<&P> {
        match self {
            Self::Success(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_treats_blank_as_empty() {
        let request = QueryRequest::new()
            .with("ticker", "AAPL")
            .with("date", "   ");
        assert_eq!(request.missing(&["ticker", "date"]), vec!["date"]);
        assert_eq!(request.missing(&["ticker", "bin"]), vec!["bin"]);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut request = QueryRequest::new().with("ticker", "QQQ").with("date", "2024-03-04");
        request.set("ticker", "AAPL");
        assert_eq!(
            request.params(),
            vec![
                ("ticker".to_string(), "AAPL".to_string()),
                ("date".to_string(), "2024-03-04".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_skip_blank_values() {
        let request = QueryRequest::new().with("ticker", "MSFT").with("bin", "");
        assert_eq!(request.params().len(), 1);
        assert!(!request.is_empty());
        assert!(QueryRequest::new().with("bin", "").is_empty());
    }

    #[test]
    fn test_outcome_message() {
        let outcome: QueryOutcome<()> = QueryOutcome::Throttled {
            reset_at_ms: 1,
            message: "wait".to_string(),
        };
        assert_eq!(outcome.kind(), OutcomeKind::Throttled);
        assert_eq!(outcome.message(), Some("wait"));
        assert_eq!(QueryOutcome::Success(()).message(), None);
    }
}
