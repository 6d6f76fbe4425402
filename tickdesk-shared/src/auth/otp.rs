/// One-time recovery codes
///
/// This module issues and checks the 6-digit numeric code used by the
/// password-recovery flow to prove control of an account's registered email
/// address. Codes are drawn uniformly at random, live for 60 seconds, and are
/// persisted on the user row (code and expiry always written together).
///
/// Issuance persists first, then dispatches. A delivery failure therefore
/// leaves a valid code in the store with nothing delivered; the caller
/// re-requests, which overwrites the pair and re-delivers. The old code
/// stays honored until its own expiry.
///
/// Verification does not clear the stored code; a code can be verified
/// repeatedly until it expires naturally.
///
/// # Example
///
/// ```
/// use tickdesk_shared::auth::otp::generate_code;
///
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_digit()));
/// ```

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::PgPool;

use crate::models::user::User;
use crate::notify::{NotificationDispatcher, NotifyError};

/// Validity window for an issued code
pub const OTP_TTL_SECONDS: i64 = 60;

/// Subject line for the delivery mail
const MAIL_SUBJECT: &str = "Verification code";

/// Error type for one-time-code operations
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// Supplied code does not match, or the window has closed
    #[error("Invalid or expired OTP")]
    InvalidOrExpired,

    /// The code was persisted but could not be delivered
    #[error("Failed to deliver OTP: {0}")]
    Delivery(#[from] NotifyError),

    /// Database error while persisting the code
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Generates a 6-digit numeric code, uniform over 100000..=999999
pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// Builds the delivery mail body for a code
fn mail_body(code: &str) -> String {
    format!(
        "Your verification code is: {code}\n\n\
         Please use this code within {OTP_TTL_SECONDS} seconds. \
         If you did not request this code, please ignore this email.",
    )
}

/// Issues a fresh code for a user
///
/// Generates the code, stamps expiry = now + 60 s, persists both fields on
/// the user row, then dispatches the code to the user's email address.
///
/// # Errors
///
/// - `OtpError::Database` if the code could not be persisted (nothing sent)
/// - `OtpError::Delivery` if dispatch failed; the code is already persisted
///   and remains valid until its expiry
pub async fn issue(
    pool: &PgPool,
    dispatcher: &dyn NotificationDispatcher,
    user: &User,
) -> Result<(), OtpError> {
    let code = generate_code();
    let expires_at = Utc::now() + Duration::seconds(OTP_TTL_SECONDS);

    User::set_otp(pool, user.id, &code, expires_at).await?;

    dispatcher
        .send(&user.email, MAIL_SUBJECT, &mail_body(&code))
        .await?;

    Ok(())
}

/// Checks a supplied code against the user's stored pair
///
/// Succeeds iff the supplied code equals the stored one AND `now` is not
/// past the stored expiry. Performs no mutation — the stored code survives
/// a successful check.
///
/// # Errors
///
/// Returns `OtpError::InvalidOrExpired` when no code is pending, the code
/// differs, or the window has closed.
pub fn verify(user: &User, supplied: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
    match (user.otp.as_deref(), user.otp_expires_at) {
        (Some(stored), Some(expires_at)) if stored == supplied && now <= expires_at => Ok(()),
        _ => Err(OtpError::InvalidOrExpired),
    }
}
