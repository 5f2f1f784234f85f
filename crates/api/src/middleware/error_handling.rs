//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the SIAGA API.
//! It maps domain-specific errors to appropriate HTTP status codes and JSON
//! error responses, ensuring a consistent error handling experience across
//! the entire API.
//!
//! The implementation is based on Axum's error handling mechanisms and integrates
//! with SIAGA's custom error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use siaga_core::errors::SiagaError;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `SiagaError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
///
/// # Example
///
/// ```ignore
/// async fn handler(id: Uuid) -> Result<Json<AlertResponse>, AppError> {
///     let alert = repositories::alerts::get_alert_by_id(&pool, id)
///         .await
///         .map_err(SiagaError::Database)?
///         .ok_or_else(|| SiagaError::NotFound(format!("Alert with ID {id} not found")))?;
///
///     Ok(Json(to_response(alert)))
/// }
/// ```
#[derive(Debug)]
pub struct AppError(pub SiagaError);

/// Converts application errors to HTTP responses
///
/// This implementation maps each error type to the appropriate HTTP status code
/// and formats the error message into a JSON response body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            SiagaError::NotFound(_) => StatusCode::NOT_FOUND,
            SiagaError::Validation(_) => StatusCode::BAD_REQUEST,
            SiagaError::Conflict(_) => StatusCode::CONFLICT,
            SiagaError::Authentication(_) => StatusCode::UNAUTHORIZED,
            SiagaError::Authorization(_) => StatusCode::FORBIDDEN,
            SiagaError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SiagaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Get the error message and format as JSON
        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        // Combine status code and JSON body into a response
        (status, body).into_response()
    }
}

/// Automatic conversion from SiagaError to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, SiagaError>` in handler functions that return `Result<T, AppError>`.
impl From<SiagaError> for AppError {
    fn from(err: SiagaError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, eyre::Report>` in handler functions that return `Result<T, AppError>`.
/// It wraps the eyre error in a SiagaError::Database variant.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(SiagaError::Database(err))
    }
}

/// Maps a SiagaError to an HTTP response
///
/// This function is provided for code paths that build a response directly
/// instead of returning `Result<_, AppError>` from a handler.
pub fn map_error(err: SiagaError) -> Response {
    AppError(err).into_response()
}
