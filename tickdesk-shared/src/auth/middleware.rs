/// Authentication middleware for Axum
///
/// This module provides the per-request gate in front of protected routes:
/// it extracts a bearer token from the `Authorization` header, validates it,
/// and adds an [`AuthContext`] to request extensions for handlers to read.
///
/// The extraction and validation steps are exposed separately
/// ([`bearer_token`] / [`authenticate`]) because the token-introspection
/// endpoint needs to distinguish "no header at all" (401) from "header
/// present but token invalid" (reported in a 200 body).
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use tickdesk_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.name)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, Claims};
use crate::models::user::UserRole;

/// Authentication context added to request extensions
///
/// A snapshot of the verified token's identity claims. Handlers extract it
/// with Axum's `Extension` extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email claim from the token
    pub email: String,

    /// Name claim from the token
    pub name: String,

    /// Role claim from the token
    pub role: UserRole,
}

impl AuthContext {
    /// Creates auth context from verified claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            name: claims.name.clone(),
            role: claims.role,
        }
    }
}

/// Error type for the authentication gate
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header present but not `Bearer <token>`
    InvalidFormat(String),

    /// Token validation failed (malformed, bad signature, or expired)
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// Extracts the bearer token from request headers
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if there is no `Authorization` header
/// - `AuthError::InvalidFormat` if the header is not a `Bearer` credential
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Authenticates a request's headers against the signing secret
///
/// Combines [`bearer_token`] extraction with token validation. Malformed
/// input, a bad signature and an expired token all collapse into
/// `AuthError::InvalidToken` here; callers that care about the distinction
/// validate the claims themselves before this point.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, secret)
        .map_err(|e| AuthError::InvalidToken(format!("Invalid token: {}", e)))?;

    Ok(AuthContext::from_claims(&claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let headers = headers_with_token("abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_authenticate_valid_token() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "alice@example.org".to_string(),
            "Alice".to_string(),
            UserRole::Admin,
        );
        let token = create_token(&claims, SECRET).unwrap();

        let auth = authenticate(&headers_with_token(&token), SECRET).unwrap();
        assert_eq!(auth.user_id, claims.sub);
        assert_eq!(auth.email, "alice@example.org");
        assert_eq!(auth.role, UserRole::Admin);
    }

    #[test]
    fn test_authenticate_rejects_tampered_token() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "alice@example.org".to_string(),
            "Alice".to_string(),
            UserRole::User,
        );
        let token = create_token(&claims, "another-secret-of-32-bytes-xxxxx").unwrap();

        assert!(matches!(
            authenticate(&headers_with_token(&token), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
