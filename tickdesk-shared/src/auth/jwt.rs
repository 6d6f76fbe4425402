/// JWT session token generation and validation
///
/// This module issues and verifies the signed, time-boxed bearer credential
/// carrying identity claims. Tokens are signed with HS256 (HMAC-SHA256) and
/// are not tracked server-side; a token is valid for exactly 24 hours from
/// issuance.
///
/// The signing secret is an immutable configuration value loaded once at
/// startup and passed in by reference; nothing here mutates process state,
/// so issuance and verification are safe under unbounded concurrency.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: fixed 24 hours, validated with zero leeway
/// - **Validation**: signature, expiration, not-before and issuer checks
/// - **Secret Management**: secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use tickdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use tickdesk_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(
///     Uuid::new_v4(),
///     "alice@example.org".to_string(),
///     "Alice".to_string(),
///     UserRole::User,
/// );
///
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, claims.sub);
/// assert_eq!(validated.role, UserRole::User);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Issuer claim stamped into every token
const ISSUER: &str = "tickdesk";

/// Fixed session lifetime: 24 hours from issuance
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token (malformed input or bad signature)
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// Session claims carried by a bearer token
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "tickdesk")
/// - `iat` / `exp` / `nbf`: issuance, expiry, not-before timestamps
///
/// # Custom Claims
///
/// - `email`, `name`, `role`: identity snapshot taken at login; a role
///   change only takes effect at the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Email address at issuance
    pub email: String,

    /// Display name at issuance
    pub name: String,

    /// Role at issuance
    pub role: UserRole,

    /// Issuer - always "tickdesk"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates new claims expiring 24 hours from now
    pub fn new(user_id: Uuid, email: String, name: String, role: UserRole) -> Self {
        Self::with_expiration(user_id, email, name, role, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Creates claims with a custom expiration offset
    ///
    /// Production code always uses [`Claims::new`]; this exists so expiry
    /// behavior can be exercised in tests without waiting a day.
    pub fn with_expiration(
        user_id: Uuid,
        email: String,
        name: String,
        role: UserRole,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            email,
            name,
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration, or None if already expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Creates a signed JWT from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// Verifies the signature, expiry (with zero leeway, so a token one second
/// past `exp` is already invalid), not-before and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` if the token is past its expiry
/// - `JwtError::InvalidIssuer` on an issuer mismatch
/// - `JwtError::ValidationError` for malformed input or a bad signature
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
