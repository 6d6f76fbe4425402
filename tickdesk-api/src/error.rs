/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// Handlers return `Result<T, ApiError>` which converts automatically into
/// the right status code and a `{success: false, message}` JSON body.
///
/// Two failure shapes deliberately do NOT go through this type: login's
/// unknown-email outcome and change-password's wrong-old-password outcome
/// are 200 responses with `success: false` in the body, matching the
/// documented behavior of those flows. Handlers build those directly.
///
/// # Example
///
/// ```no_run
/// use tickdesk_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound("User not found".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use tickdesk_shared::auth::{
    authorization::AuthzError, jwt::JwtError, middleware::AuthError, otp::OtpError,
    password::PasswordError,
};
use tickdesk_shared::notify::NotifyError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Missing or invalid credential (401)
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// An account with this email already exists (400)
    DuplicateEmail,

    /// Request body failed validation (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// One-time code mismatch or window closed (400)
    InvalidOtp,

    /// Recovery code could not be delivered (500)
    ///
    /// The code is already persisted when this is raised; the caller must
    /// re-request to get a fresh delivery.
    DeliveryError(String),

    /// Internal server error (500) — persistence or hashing failures
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false for errors
    pub success: bool,

    /// Human-readable error message
    pub message: String,

    /// Structured validation violations, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DuplicateEmail => write!(f, "Email already exists"),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InvalidOtp => write!(f, "Invalid or expired OTP"),
            ApiError::DeliveryError(msg) => write!(f, "Delivery failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Converts `validator` output into a structured validation error
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "Email already exists".to_string(),
                None,
            ),
            ApiError::ValidationError(details) => (
                StatusCode::BAD_REQUEST,
                "Request validation failed".to_string(),
                Some(details),
            ),
            ApiError::InvalidOtp => (
                StatusCode::BAD_REQUEST,
                "Invalid or expired OTP".to_string(),
                None,
            ),
            ApiError::DeliveryError(msg) => {
                tracing::error!("Delivery error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send verification code".to_string(),
                    None,
                )
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            errors,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique constraint on users.email surfaces as duplicate email
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::DuplicateEmail;
                    }
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert password-hashing errors to API errors
///
/// A mismatch is `Ok(false)` at the hasher and never reaches here; anything
/// that does is a real internal failure.
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            // Malformed, bad signature and expired all collapse outward
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert authentication-gate errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Unauthorized".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::Unauthorized(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::InsufficientRole { .. } => {
                ApiError::Forbidden("Insufficient permissions".to_string())
            }
            AuthzError::NotAuthorized => {
                ApiError::Forbidden("Not authorized to access this resource".to_string())
            }
        }
    }
}

/// Convert one-time-code errors to API errors
impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::InvalidOrExpired => ApiError::InvalidOtp,
            OtpError::Delivery(e) => ApiError::DeliveryError(e.to_string()),
            OtpError::Database(e) => ApiError::from(e),
        }
    }
}

/// Convert notification errors to API errors
impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        ApiError::DeliveryError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");

        assert_eq!(ApiError::DuplicateEmail.to_string(), "Email already exists");
        assert_eq!(ApiError::InvalidOtp.to_string(), "Invalid or expired OTP");
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_otp_error_mapping() {
        assert!(matches!(
            ApiError::from(OtpError::InvalidOrExpired),
            ApiError::InvalidOtp
        ));
        assert!(matches!(
            ApiError::from(OtpError::Delivery(NotifyError::Delivery("down".into()))),
            ApiError::DeliveryError(_)
        ));
    }

    #[test]
    fn test_jwt_error_collapses_to_unauthorized() {
        assert!(matches!(
            ApiError::from(JwtError::Expired),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(JwtError::ValidationError("bad".into())),
            ApiError::Unauthorized(_)
        ));
    }
}
