//! Error types shared by the gateway and the view modules
//!
//! Failures fall into two layers: [`GatewayError`] covers storage and row
//! encoding problems inside the data gateway, [`AppError`] carries the
//! user-facing outcomes of a view operation. Every failure is terminal for
//! the action that triggered it; the user may simply retry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure inside the table gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The underlying embedded store reported an error.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// A stored row or an outgoing record could not be (de)serialized.
    #[error("row encoding error: {0}")]
    Codec(#[from] serde_json::Error),

    /// A record handed to the gateway was not a JSON object.
    #[error("record is not a JSON object")]
    Malformed,

    /// A single-row lookup returned the wrong number of rows.
    #[error("expected exactly one row, found {0}")]
    RowCount(usize),
}

// redb reports granular error types per operation; fold them all into the
// storage variant so gateway code can use `?` throughout.
impl From<redb::DatabaseError> for GatewayError {
    fn from(err: redb::DatabaseError) -> Self {
        Self::Storage(err.into())
    }
}

impl From<redb::TransactionError> for GatewayError {
    fn from(err: redb::TransactionError) -> Self {
        Self::Storage(err.into())
    }
}

impl From<redb::TableError> for GatewayError {
    fn from(err: redb::TableError) -> Self {
        Self::Storage(err.into())
    }
}

impl From<redb::StorageError> for GatewayError {
    fn from(err: redb::StorageError) -> Self {
        Self::Storage(err.into())
    }
}

impl From<redb::CommitError> for GatewayError {
    fn from(err: redb::CommitError) -> Self {
        Self::Storage(err.into())
    }
}

/// Outcome of a view operation that could not complete.
///
/// Validation failures block the gateway call entirely and leave the form
/// populated for retry; gateway failures leave the cached collection
/// untouched.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required field is missing or malformed. The message is shown to
    /// the user as-is.
    #[error("{0}")]
    Validation(String),

    /// A client with the same company name already exists in the cached
    /// collection.
    #[error("{0}")]
    Duplicate(String),

    /// The activity log was asked to mutate without a client scope.
    #[error("{0}")]
    MissingScope(String),

    /// The referenced record is not in the cached collection.
    #[error("{0}")]
    NotFound(String),

    /// The remote data gateway failed; nothing was changed locally.
    #[error("gateway failure: {0}")]
    Gateway(#[from] GatewayError),
}

impl AppError {
    /// Stable machine-readable tag for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Duplicate(_) => "duplicate",
            AppError::MissingScope(_) => "missing_scope",
            AppError::NotFound(_) => "not_found",
            AppError::Gateway(_) => "gateway",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MissingScope(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Gateway(GatewayError::Codec(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({
                "error": self.to_string(),
                "code": self.code()
            })),
        )
            .into_response()
    }
}
