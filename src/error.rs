// HTTP API Error Types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::DatabaseError;
use crate::query::QueryError;
use crate::schema::ValidationError;

/// Challenge advertised with every authentication failure.
pub const BEARER_CHALLENGE: &str = "Token type=\"Bearer\"";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest {
        code: Option<String>,
        description: String,
    },
    ValidationError {
        description: String,
        field_errors: HashMap<String, String>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    AuthenticationRequired {
        title: String,
        description: String,
        challenges: Vec<String>,
    },
    Unauthorized(String),

    // 404 Not Found
    NotFound {
        code: Option<String>,
        description: String,
    },

    // 409 Conflict
    Conflict {
        code: Option<String>,
        description: String,
    },

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest { .. } => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::AuthenticationRequired { .. } => 401,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound { .. } => 404,
            ApiError::Conflict { .. } => 409,
            ApiError::InternalServerError(_) => 500,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ApiError::BadRequest { .. } => "Bad Request",
            ApiError::ValidationError { .. } => "ValidationError",
            ApiError::InvalidJson(_) => "Malformed JSON",
            ApiError::AuthenticationRequired { title, .. } => title,
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::NotFound { .. } => "Not Found",
            ApiError::Conflict { .. } => "Conflict",
            ApiError::InternalServerError(_) => "Internal Server Error",
        }
    }

    /// Get client-safe error description
    pub fn description(&self) -> &str {
        match self {
            ApiError::BadRequest { description, .. } => description,
            ApiError::ValidationError { description, .. } => description,
            ApiError::InvalidJson(msg) => msg,
            ApiError::AuthenticationRequired { description, .. } => description,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound { description, .. } => description,
            ApiError::Conflict { description, .. } => description,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling; collaborator codes win over the generic ones
    pub fn error_code(&self) -> &str {
        match self {
            ApiError::BadRequest { code: Some(code), .. }
            | ApiError::NotFound { code: Some(code), .. }
            | ApiError::Conflict { code: Some(code), .. } => code,
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::AuthenticationRequired { .. } => "AUTHENTICATION_REQUIRED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn challenges(&self) -> &[String] {
        match self {
            ApiError::AuthenticationRequired { challenges, .. } => challenges,
            _ => &[],
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "title": self.title(),
            "description": self.description(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors, .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(description: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code: None,
            description: description.into(),
        }
    }

    pub fn validation_error(description: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::ValidationError {
            description: description.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    /// 401 with the bearer challenge attached.
    pub fn authentication_required(title: impl Into<String>, description: impl Into<String>) -> Self {
        ApiError::AuthenticationRequired {
            title: title.into(),
            description: description.into(),
            challenges: vec![BEARER_CHALLENGE.to_string()],
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(description: impl Into<String>) -> Self {
        ApiError::NotFound {
            code: None,
            description: description.into(),
        }
    }

    pub fn conflict(description: impl Into<String>) -> Self {
        ApiError::Conflict {
            code: None,
            description: description.into(),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::AlreadyExists { code, message } => ApiError::Conflict {
                code: Some(code),
                description: message,
            },
            DatabaseError::NotFound { code, message } => ApiError::NotFound {
                code: Some(code),
                description: message,
            },
            DatabaseError::Other { code, message } => ApiError::BadRequest {
                code: Some(code),
                description: message,
            },
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation_error(err.to_string(), err.field_errors())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::BadRequest {
            code: Some("INVALID_QUERY".to_string()),
            description: err.to_string(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title(), self.description())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.to_json())).into_response();

        for challenge in self.challenges() {
            if let Ok(value) = HeaderValue::from_str(challenge) {
                response.headers_mut().append(header::WWW_AUTHENTICATE, value);
            }
        }

        response
    }
}
