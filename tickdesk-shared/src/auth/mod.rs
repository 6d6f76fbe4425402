/// Authentication and authorization utilities
///
/// This module provides the secure primitives behind the identity flows:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: signed session tokens with a fixed 24-hour lifetime
/// - [`otp`]: 6-digit one-time recovery codes with a 60-second window
/// - [`middleware`]: bearer-token extraction and the request auth gate
/// - [`authorization`]: role and ownership checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: HS256 signing, zero-leeway expiry validation
/// - **One-time Codes**: uniform random, short-lived, delivered out-of-band

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod otp;
pub mod password;
