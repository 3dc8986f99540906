use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CcrError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error to {address}: {details}")]
    Connection { address: String, details: String },

    #[error("{0}")]
    Api(ApiError),

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Operation timed out: {operation} after {duration:?}")]
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type CcrResult<T> = std::result::Result<T, CcrError>;

impl CcrError {
    /// True for errors carrying a structured payload returned by the cluster.
    pub fn is_api_error(&self) -> bool {
        matches!(self, CcrError::Api(_))
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            CcrError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for CcrError {
    fn from(err: ApiError) -> Self {
        CcrError::Api(err)
    }
}

impl From<toml::de::Error> for CcrError {
    fn from(err: toml::de::Error) -> Self {
        CcrError::ConfigError(format!("Invalid TOML: {}", err))
    }
}

/// Error payload returned by the cluster for a failed request.
///
/// Mirrors the Elasticsearch shape:
/// `{"error": {"type": "...", "reason": "..."}, "status": 404}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub error_type: Option<String>,
    pub reason: String,
}

impl ApiError {
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            error_type: None,
            reason: reason.into(),
        }
    }

    /// A failure where no response arrived. Status 0 marks the missing response.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::new(0, reason)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Parse an error response body. Bodies that are not in the cluster's error
    /// shape still produce an `ApiError` carrying the raw text.
    pub fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Cause {
            #[serde(rename = "type")]
            error_type: Option<String>,
            reason: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ErrorField {
            Detailed(Cause),
            Message(String),
        }

        #[derive(Deserialize)]
        struct Envelope {
            error: ErrorField,
        }

        match serde_json::from_str::<Envelope>(body) {
            Ok(Envelope {
                error: ErrorField::Detailed(cause),
            }) => Self {
                status,
                reason: cause
                    .reason
                    .or_else(|| cause.error_type.clone())
                    .unwrap_or_else(|| format!("Request failed with status {}", status)),
                error_type: cause.error_type,
            },
            Ok(Envelope {
                error: ErrorField::Message(message),
            }) => Self::new(status, message),
            Err(_) if body.trim().is_empty() => {
                Self::new(status, format!("Request failed with status {}", status))
            }
            Err(_) => Self::new(status, body.trim()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error_type, self.status) {
            (_, 0) => f.write_str(&self.reason),
            (Some(error_type), status) => write!(f, "[{}] {}: {}", status, error_type, self.reason),
            (None, status) => write!(f, "[{}] {}", status, self.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cluster_error_body() {
        let body = r#"{"error":{"root_cause":[],"type":"index_not_found_exception","reason":"no such index [orders]"},"status":404}"#;
        let err = ApiError::from_body(404, body);

        assert_eq!(err.status, 404);
        assert_eq!(err.error_type.as_deref(), Some("index_not_found_exception"));
        assert_eq!(err.reason, "no such index [orders]");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parse_plain_text_body() {
        let err = ApiError::from_body(502, "Bad Gateway\n");
        assert_eq!(err.reason, "Bad Gateway");
        assert_eq!(err.error_type, None);

        let empty = ApiError::from_body(500, "");
        assert_eq!(empty.reason, "Request failed with status 500");
    }

    #[test]
    fn test_api_error_conversion() {
        let err: CcrError = ApiError::new(409, "exists").into();
        assert!(err.is_api_error());
        assert_eq!(err.api_error().map(|e| e.status), Some(409));

        let other = CcrError::Internal {
            message: "boom".to_string(),
        };
        assert!(!other.is_api_error());
    }
}
