// Client error taxonomy
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Why the session guard refused a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    NoSession,
    RoleMismatch,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoSession => "no-session",
            DenyReason::RoleMismatch => "role-mismatch",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure a view, guard or resource client can produce
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    // No credential, or an expired one
    #[error("not authenticated")]
    Unauthenticated,

    #[error("unauthorized: {0}")]
    Unauthorized(DenyReason),

    // status is 0 when the request never produced an HTTP response
    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("malformed token")]
    MalformedToken,

    // Input the user has to correct
    #[error("validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        ClientError::RequestFailed { status, body: body.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation { message: message.into(), field_errors: None }
    }

    pub fn field_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.into(), message.clone());
        ClientError::Validation { message, field_errors: Some(field_errors) }
    }

    /// True when the only way forward is a fresh login
    pub fn is_session_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated
                | ClientError::MalformedToken
                | ClientError::Unauthorized(DenyReason::NoSession)
                | ClientError::RequestFailed { status: 401, .. }
        )
    }

    /// Plain-language text safe to show to a user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthenticated
            | ClientError::MalformedToken
            | ClientError::Unauthorized(DenyReason::NoSession) => {
                "Your session has expired. Please log in again.".to_string()
            }
            ClientError::Unauthorized(DenyReason::RoleMismatch) => {
                "You do not have permission to view that page.".to_string()
            }
            ClientError::RequestFailed { status, .. } => match status {
                0 => "Could not reach the server. Please try again later.".to_string(),
                401 => "Your session has expired. Please log in again.".to_string(),
                403 => "You are not allowed to perform this action.".to_string(),
                404 => "The requested item could not be found.".to_string(),
                409 => "This item was changed elsewhere. Refresh and try again.".to_string(),
                _ => "Something went wrong. Please try again later.".to_string(),
            },
            ClientError::Validation { message, .. } => message.clone(),
            ClientError::Storage(_) => "Could not access the saved session.".to_string(),
            ClientError::Config(_) => "The application is not configured correctly.".to_string(),
        }
    }

    /// Stable code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Unauthenticated => "UNAUTHENTICATED",
            ClientError::Unauthorized(_) => "UNAUTHORIZED",
            ClientError::RequestFailed { .. } => "REQUEST_FAILED",
            ClientError::MalformedToken => "MALFORMED_TOKEN",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Config(_) => "CONFIG_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.user_message(),
            "error_code": self.error_code(),
        });

        if let ClientError::Validation { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
        ClientError::RequestFailed { status, body: err.to_string() }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}
