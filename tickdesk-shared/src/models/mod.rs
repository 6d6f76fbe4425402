/// Database models for tickdesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, roles and the pending one-time code
/// - `ticket`: Deadline-bound work items with a lifecycle status
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
/// # Ok(())
/// # }
/// ```

pub mod ticket;
pub mod user;
