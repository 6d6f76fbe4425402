/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts. Passwords are stored as Argon2id hashes, never in plaintext; the
/// one-time recovery code and its expiry live on the user row and are always
/// written together.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'user');
/// CREATE TYPE user_status AS ENUM ('active', 'inactive');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     phone VARCHAR(32) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     otp VARCHAR(6),
///     otp_expires_at TIMESTAMPTZ,
///     role user_role NOT NULL DEFAULT 'user',
///     status user_status NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Email uniqueness is enforced by the database; lookups are case-sensitive
/// (`VARCHAR`, not `CITEXT`), fixed at creation time.
///
/// # Example
///
/// ```no_run
/// use tickdesk_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     name: "Alice".to_string(),
///     email: "alice@example.org".to_string(),
///     phone: "5551234".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "alice@example.org").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Coarse permission class for gated operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can manage users and other administrative resources
    Admin,

    /// Regular account, default at registration
    User,
}

impl UserRole {
    /// Converts role to string for responses and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

/// Account status, flipped by the administrative toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Account may log in
    Active,

    /// Account is locked out of login
    Inactive,
}

impl UserStatus {
    /// Converts status to string for responses and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }

    /// Returns the opposite status (the admin toggle)
    pub fn toggled(&self) -> UserStatus {
        match self {
            UserStatus::Active => UserStatus::Inactive,
            UserStatus::Inactive => UserStatus::Active,
        }
    }
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique and case-sensitive
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Argon2id password hash, never empty once the row exists
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Pending one-time recovery code, if any
    #[serde(skip_serializing)]
    pub otp: Option<String>,

    /// Expiry of the pending one-time code
    ///
    /// Set together with `otp`, never one without the other.
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,

    /// Role for authorization gating
    pub role: UserRole,

    /// Account status
    pub status: UserStatus,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// Role and status take their database defaults (`user`, `active`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address (must not already exist)
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Argon2id password hash (NOT the plaintext password!)
    pub password_hash: String,
}

const USER_COLUMNS: &str =
    "id, name, email, phone, password_hash, otp, otp_expires_at, role, status, created_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database is unavailable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-sensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored password hash
    ///
    /// Used by the recovery and change-password flows. Returns true if the
    /// user existed.
    pub async fn set_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores a one-time code and its expiry on the user row
    ///
    /// Both fields are written in a single statement so the pair is never
    /// half-set. A later call overwrites any previous pending code.
    ///
    /// This is a plain read-modify-write against the row; two concurrent
    /// recovery requests race and the later write wins.
    pub async fn set_otp(
        pool: &PgPool,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET otp = $2, otp_expires_at = $3 WHERE id = $1")
                .bind(id)
                .bind(code)
                .bind(expires_at)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sets the account status, returning the updated row
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: UserStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET status = $2 WHERE id = $1 RETURNING {USER_COLUMNS}",
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Promotes or demotes a user's role, returning the updated row
    pub async fn set_role(
        pool: &PgPool,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}",
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users with optional name search and pagination
    ///
    /// `keyword` filters on a case-insensitive substring of the display name.
    /// Results are ordered by creation date, newest first.
    pub async fn search(
        pool: &PgPool,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = keyword.map(|k| format!("%{k}%"));

        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::text IS NULL OR name ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts users matching the optional name search
    pub async fn count(pool: &PgPool, keyword: Option<&str>) -> Result<i64, sqlx::Error> {
        let pattern = keyword.map(|k| format!("%{k}%"));

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE $1::text IS NULL OR name ILIKE $1",
        )
        .bind(pattern)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
