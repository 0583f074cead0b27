//! Share Error Types
//!
//! Share-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::{AppError, FieldError};
use kernel::error::kind::ErrorKind;
use thiserror::Error;
use tracing::Level;

/// The only message a caller sees for a failed or internal issuance
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong, please try again or contact support.";

/// Share-specific result type alias
pub type ShareResult<T> = Result<T, ShareError>;

/// Share-specific error variants
#[derive(Debug, Error)]
pub enum ShareError {
    /// Path or body does not match the declared schema
    #[error("Request validation failed")]
    Validation(Vec<FieldError>),

    /// Body exceeds the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// No credential, or one that maps to no user
    #[error("Missing or invalid credentials")]
    Unauthenticated,

    /// Caller is not an active member of the company
    #[error("You do not have access to this company")]
    Forbidden,

    /// Company does not exist
    #[error("Company not found")]
    CompanyNotFound,

    /// Issuance service reported failure or returned no data.
    /// The service's own message is logged, never returned.
    #[error("Share issuance failed")]
    IssuanceFailed,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShareError {
    /// Single-field validation error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ShareError::Validation(vec![FieldError::new(field, message)])
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShareError::Validation(_) => ErrorKind::BadRequest,
            ShareError::PayloadTooLarge => ErrorKind::PayloadTooLarge,
            ShareError::Unauthenticated => ErrorKind::Unauthorized,
            ShareError::Forbidden => ErrorKind::Forbidden,
            ShareError::CompanyNotFound => ErrorKind::NotFound,
            ShareError::IssuanceFailed | ShareError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server errors keep `self` as the source and expose only the generic
    /// message.
    pub fn into_app_error(self) -> AppError {
        let message = self.to_string();
        match self {
            ShareError::Validation(fields) => AppError::bad_request(message)
                .with_field_errors(fields)
                .with_action("Fix the listed fields and retry"),
            ShareError::PayloadTooLarge => AppError::payload_too_large(message)
                .with_action("Send a smaller request body"),
            ShareError::Unauthenticated => AppError::unauthorized(message)
                .with_action("Send a valid bearer token in the Authorization header"),
            ShareError::Forbidden => AppError::forbidden(message),
            ShareError::CompanyNotFound => AppError::not_found(message),
            ShareError::IssuanceFailed | ShareError::Internal(_) => {
                AppError::internal(GENERIC_FAILURE_MESSAGE).with_source(self)
            }
        }
    }

    /// Level this error is logged at when rendered
    ///
    /// `IssuanceFailed` is already logged at warn, with the service message,
    /// where it is raised.
    pub fn log_level(&self) -> Level {
        match self {
            ShareError::Internal(_) => Level::ERROR,
            ShareError::Forbidden => Level::WARN,
            _ => Level::DEBUG,
        }
    }

    fn log(&self) {
        let level = self.log_level();
        if level == Level::ERROR {
            tracing::error!(error = %self, "Share internal error");
        } else if level == Level::WARN {
            tracing::warn!(error = %self, "Share request denied");
        } else {
            tracing::debug!(error = %self, "Share request rejected");
        }
    }
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}
