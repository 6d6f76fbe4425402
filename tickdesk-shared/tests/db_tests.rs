/// Database integration tests for the shared crate
///
/// These run against the database named by DATABASE_URL and skip with a
/// note when it is unset.

use chrono::{Duration, Utc};
use tickdesk_shared::db::migrations::run_migrations;
use tickdesk_shared::db::pool::{create_pool, health_check, DatabaseConfig};
use tickdesk_shared::models::ticket::{CreateTicket, Ticket, TicketStatus};
use tickdesk_shared::models::user::{CreateUser, User, UserStatus};
use uuid::Uuid;

async fn test_pool() -> Option<sqlx::PgPool> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 5,
        ..Default::default()
    })
    .await
    .expect("failed to connect to test database");

    run_migrations(&pool).await.expect("failed to run migrations");

    Some(pool)
}

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.org", prefix, Uuid::new_v4())
}

async fn create_test_user(pool: &sqlx::PgPool, prefix: &str) -> User {
    User::create(
        pool,
        CreateUser {
            name: "Test User".to_string(),
            email: unique_email(prefix),
            phone: "5551234567".to_string(),
            password_hash: "$argon2id$test-hash".to_string(),
        },
    )
    .await
    .expect("failed to create user")
}

#[tokio::test]
async fn test_pool_health_and_migrations_idempotent() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return;
    };

    health_check(&pool).await.expect("health check should pass");

    // Re-running migrations is a no-op
    run_migrations(&pool).await.expect("second run should be a no-op");
}

#[tokio::test]
async fn test_user_email_uniqueness() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return;
    };

    let user = create_test_user(&pool, "unique").await;

    let duplicate = User::create(
        &pool,
        CreateUser {
            name: "Other".to_string(),
            email: user.email.clone(),
            phone: "5550000000".to_string(),
            password_hash: "$argon2id$other-hash".to_string(),
        },
    )
    .await;

    assert!(duplicate.is_err(), "duplicate email must be rejected");
}

#[tokio::test]
async fn test_user_defaults_and_otp_pair() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return;
    };

    let user = create_test_user(&pool, "defaults").await;
    assert_eq!(user.status, UserStatus::Active);
    assert!(user.otp.is_none());
    assert!(user.otp_expires_at.is_none());

    // Code and expiry are written together
    let expires_at = Utc::now() + Duration::seconds(60);
    assert!(User::set_otp(&pool, user.id, "123456", expires_at).await.unwrap());

    let reloaded = User::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.otp.as_deref(), Some("123456"));
    assert!(reloaded.otp_expires_at.is_some());
}

#[tokio::test]
async fn test_ticket_mark_missed_guard() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return;
    };

    let user = create_test_user(&pool, "tickets").await;
    let now = Utc::now();

    let overdue = Ticket::create(
        &pool,
        CreateTicket {
            owner_id: user.id,
            title: "Overdue".to_string(),
            description: "d".to_string(),
            deadline: now - Duration::hours(1),
        },
    )
    .await
    .unwrap();

    let on_time = Ticket::create(
        &pool,
        CreateTicket {
            owner_id: user.id,
            title: "On time".to_string(),
            description: "d".to_string(),
            deadline: now + Duration::hours(1),
        },
    )
    .await
    .unwrap();

    // Only the overdue pending ticket transitions
    assert!(Ticket::mark_missed(&pool, overdue.id, now).await.unwrap());
    assert!(!Ticket::mark_missed(&pool, on_time.id, now).await.unwrap());

    // Marking missed twice is a no-op
    assert!(!Ticket::mark_missed(&pool, overdue.id, now).await.unwrap());

    let reloaded = Ticket::find_by_id(&pool, overdue.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, TicketStatus::Missed);
}
