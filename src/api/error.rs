//! HTTP error translation
//!
//! Two outcomes only: a missing item (404) and everything else (500). The 500 body
//! echoes the underlying error text, which is acceptable for a non-production tool.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Error returned by every API handler
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Requested id doesn't exist
    #[error("Item not found")]
    NotFound,
    /// Any other failure, store errors included
    #[error("Server Error: {0:#}")]
    Unhandled(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Unhandled(e) = &self {
            tracing::error!("❌ Request failed: {:#}", e);
        }
        let status = self.status_code();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Same 500 shape for panics caught by `CatchPanicLayer`
pub fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::Unhandled(anyhow::anyhow!("{}", message)).into_response()
}
