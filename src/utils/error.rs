use actix_web::{http::StatusCode, HttpResponse};
use mongodb::error::{ErrorKind, WriteFailure};
use std::fmt;

/// Errors raised by a record store. "Not found" is never an error here:
/// lookups return `None` / an empty list and mutations report `matched == 0`.
#[derive(Debug)]
pub enum StoreError {
    Connectivity(String),
    Serialization(String),
    InvalidFilter(String),
    MissingIdentifier,
    DuplicateIdentifier(String),
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connectivity(msg) => write!(f, "Database unreachable: {}", msg),
            StoreError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StoreError::InvalidFilter(msg) => write!(f, "Invalid filter: {}", msg),
            StoreError::MissingIdentifier => write!(f, "Record has no identifier"),
            StoreError::DuplicateIdentifier(id) => write!(f, "Duplicate identifier: {}", id),
            StoreError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

const DUPLICATE_KEY: i32 = 11000;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::Io(_) => StoreError::Connectivity(err.to_string()),
            ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
                StoreError::Serialization(err.to_string())
            }
            ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
                StoreError::DuplicateIdentifier(write.message.clone())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for StoreError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[derive(Debug)]
pub enum AppError {
    Database(String),
    NotFound(String),
    Forbidden(String),
    Unauthorized(String),
    InvalidRequest(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// JSON body in the `{ success, error }` shape every handler returns.
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string()
        }))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidFilter(_) | StoreError::MissingIdentifier => {
                AppError::InvalidRequest(err.to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}
