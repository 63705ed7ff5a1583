use actix_web::{HttpResponse, http::StatusCode};
use sea_orm::DbErr;
use thiserror::Error;

use crate::payments::GatewayError;

/// Error taxonomy for the booking flow. Every variant is translated into a
/// JSON `{"error": ...}` body at the request boundary; none of them crash the
/// serving process.
///
/// Refund failure is deliberately absent: an owner-cancel whose refund call
/// fails still cancels the booking and surfaces a warning in the success body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotAuthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// The requested dates were taken between the advisory check and the
    /// booking write. When this fires after payment capture, the gateway's
    /// idempotent refund makes the client whole; the message says so.
    #[error("this property is no longer available for the selected dates; \
             any captured payment will be refunded")]
    SlotConflict,

    #[error("invalid signature, payment verification failed")]
    PaymentVerificationFailed,

    /// A concurrent writer updated the booking first (version mismatch).
    #[error("the booking was modified concurrently, please retry")]
    VersionConflict,

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SlotConflict => StatusCode::CONFLICT,
            ApiError::PaymentVerificationFailed => StatusCode::BAD_REQUEST,
            ApiError::VersionConflict => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, ApiError::Database(_) | ApiError::Gateway(_)) {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}
