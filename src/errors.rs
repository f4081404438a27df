use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message; generic for server-side failures.
    pub error: String,
}

/// Application-specific error types surfaced by HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request body or query parameters.
    BadRequest(String),
    /// A storage call exceeded its deadline.
    Timeout(String),
    /// Persistence failure.
    Store(StoreError),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            AppError::Store(e) => write!(f, "Store error: {}", e),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Client errors echo their message; server-side failures are logged and
    /// answered with a generic message.
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Timeout(msg) => {
                tracing::error!("Timeout: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage timeout".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: error_message,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout(op) => AppError::Timeout(op),
            other => AppError::Store(other),
        }
    }
}

/// Failures reported by the persistence port.
#[derive(Debug)]
pub enum StoreError {
    /// The call did not finish within the store deadline. Carries the operation name.
    Timeout(String),
    /// An update or lookup targeted a row that does not exist.
    NotFound(String),
    /// Any other database failure.
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Timeout(op) => write!(f, "{} timed out", op),
            StoreError::NotFound(msg) => write!(f, "not found: {}", msg),
            StoreError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Failures reported by the enrichment client.
///
/// The variants mirror the distinct failure points of one lookup: the
/// deadline, the transport, the remote status and the payload shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    Timeout(String),
    Transport(String),
    RemoteStatus { status: u16, body: String },
    Decode(String),
}

impl fmt::Display for EnrichmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentError::Timeout(msg) => write!(f, "enrichment request timed out: {}", msg),
            EnrichmentError::Transport(msg) => write!(f, "enrichment request failed: {}", msg),
            EnrichmentError::RemoteStatus { status, body } if body.is_empty() => {
                write!(f, "enrichment API returned status {}", status)
            }
            EnrichmentError::RemoteStatus { status, body } => {
                write!(f, "enrichment API returned status {}: {}", status, body)
            }
            EnrichmentError::Decode(msg) => write!(f, "invalid enrichment payload: {}", msg),
        }
    }
}

impl std::error::Error for EnrichmentError {}
