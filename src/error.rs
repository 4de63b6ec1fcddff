use axum::Json;
use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use serde_json::{ json, Value };
use thiserror::Error;

/// Request-level failure taxonomy. Every variant maps to exactly one HTTP
/// status; there are no retries, the first failure is surfaced to the caller.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Required credential missing. Checked before any outbound call.
    #[error("{0}")]
    Config(String),

    /// Required request field missing or unusable.
    #[error("{0}")]
    InvalidInput(String),

    /// Provider answered but found nothing; carries the provider status.
    #[error("{message} ({status})")]
    NotFound {
        message: String,
        status: String,
    },

    /// Provider rejected the request; status and message are forwarded.
    #[error("{message} ({status})")]
    Provider {
        message: String,
        status: String,
        details: Option<String>,
    },

    /// Transport failure or unexpected provider behavior.
    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<String>,
    },
}

impl AgentError {
    pub fn upstream(message: impl Into<String>, source: impl std::fmt::Display) -> Self {
        AgentError::Upstream {
            message: message.into(),
            details: Some(source.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AgentError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AgentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AgentError::NotFound { .. } => StatusCode::NOT_FOUND,
            AgentError::Provider { .. } => StatusCode::BAD_REQUEST,
            AgentError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body matching what the browser client expects: always an
    /// `error` field, plus the provider `status` and `details` when known.
    pub fn body(&self) -> Value {
        match self {
            AgentError::Config(message) | AgentError::InvalidInput(message) => {
                json!({ "error": message })
            }
            AgentError::NotFound { message, status } => {
                json!({ "error": message, "status": status })
            }
            AgentError::Provider { message, status, details } => {
                let mut body = json!({ "error": message, "status": status });
                if let Some(details) = details {
                    body["details"] = json!(details);
                }
                body
            }
            AgentError::Upstream { message, details } => {
                let mut body = json!({ "error": message });
                if let Some(details) = details {
                    body["details"] = json!(details);
                }
                body
            }
        }
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            AgentError::Config("key missing".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AgentError::InvalidInput("origin required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AgentError::NotFound { message: "Address not found".into(), status: "ZERO_RESULTS".into() }
                .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AgentError::Provider {
                message: "Failed to get directions".into(),
                status: "REQUEST_DENIED".into(),
                details: None,
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AgentError::Upstream { message: "boom".into(), details: None }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_body_echoes_provider_status() {
        let body = AgentError::NotFound {
            message: "Address not found".into(),
            status: "ZERO_RESULTS".into(),
        }
        .body();
        assert_eq!(body["error"], "Address not found");
        assert_eq!(body["status"], "ZERO_RESULTS");
    }

    #[test]
    fn details_omitted_when_absent() {
        let body = AgentError::Upstream { message: "boom".into(), details: None }.body();
        assert!(body.get("details").is_none());
    }
}
