use thiserror::Error;

/// Failures reported by a document database.
///
/// Each variant carries the backend's own `code` and `message`; the resource
/// layer passes both through to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("{code}: {message}")]
    AlreadyExists { code: String, message: String },

    #[error("{code}: {message}")]
    NotFound { code: String, message: String },

    #[error("{code}: {message}")]
    Other { code: String, message: String },
}

impl DatabaseError {
    pub fn already_exists(message: impl Into<String>) -> Self {
        DatabaseError::AlreadyExists {
            code: "ALREADY_EXISTS".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DatabaseError::NotFound {
            code: "NOT_FOUND".to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DatabaseError::Other {
            code: "INVALID_ARGUMENT".to_string(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            DatabaseError::AlreadyExists { code, .. }
            | DatabaseError::NotFound { code, .. }
            | DatabaseError::Other { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DatabaseError::AlreadyExists { message, .. }
            | DatabaseError::NotFound { message, .. }
            | DatabaseError::Other { message, .. } => message,
        }
    }
}
