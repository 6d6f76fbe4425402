/// Ticket model and database operations
///
/// Tickets are user-owned work items with a deadline and a lifecycle status.
/// Owners create, edit and delete their own tickets; the expiry sweeper in
/// `tickdesk-worker` is the only writer allowed to move a ticket to `missed`,
/// and only once its deadline has passed.
///
/// # State Machine
///
/// ```text
/// pending → in_progress   (owner edit)
/// pending → completed     (owner edit)
/// pending → missed        (sweeper only, deadline < now)
/// in_progress → completed (owner edit)
/// ```
///
/// `completed` and `missed` are terminal.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE ticket_status AS ENUM (
///     'pending', 'in_progress', 'completed', 'missed'
/// );
///
/// CREATE TABLE tickets (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     deadline TIMESTAMPTZ NOT NULL,
///     status ticket_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Not started; eligible for the expiry sweep once overdue
    Pending,

    /// Owner has started work
    InProgress,

    /// Finished by the owner
    Completed,

    /// Deadline passed while still pending; set by the sweeper only
    Missed,
}

impl TicketStatus {
    /// Converts status to string for responses and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Completed => "completed",
            TicketStatus::Missed => "missed",
        }
    }

    /// Checks if the status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Completed | TicketStatus::Missed)
    }

    /// Checks if an owner-initiated edit may move a ticket to `target`
    ///
    /// `missed` is never reachable through an edit; that transition belongs
    /// to the expiry sweeper.
    pub fn can_edit_to(&self, target: TicketStatus) -> bool {
        match (self, target) {
            (TicketStatus::Pending, TicketStatus::InProgress) => true,
            (TicketStatus::Pending, TicketStatus::Completed) => true,
            (TicketStatus::InProgress, TicketStatus::Completed) => true,

            // No-op edits are allowed
            (a, b) if *a == b && !a.is_terminal() => true,

            _ => false,
        }
    }
}

/// Ticket model representing a deadline-bound work item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    /// Unique ticket ID
    pub id: Uuid,

    /// Owning user
    pub owner_id: Uuid,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Deadline; pending tickets past this instant are swept to `missed`
    pub deadline: DateTime<Utc>,

    /// Lifecycle status
    pub status: TicketStatus,

    /// When the ticket was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicket {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
}

/// Input for an owner edit; only non-None fields are updated
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<TicketStatus>,
}

const TICKET_COLUMNS: &str =
    "id, owner_id, title, description, deadline, status, created_at";

impl Ticket {
    /// Creates a new ticket with status `pending`
    pub async fn create(pool: &PgPool, data: CreateTicket) -> Result<Self, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            INSERT INTO tickets (owner_id, title, description, deadline)
            VALUES ($1, $2, $3, $4)
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.deadline)
        .fetch_one(pool)
        .await?;

        Ok(ticket)
    }

    /// Finds a ticket by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// Lists all tickets owned by a user, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE owner_id = $1 ORDER BY created_at DESC",
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }

    /// Applies an owner edit, returning the updated row
    ///
    /// Callers are responsible for checking `can_edit_to` before changing
    /// status; this function writes whatever it is given.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTicket,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                deadline = COALESCE($4, deadline),
                status = COALESCE($5, status)
            WHERE id = $1
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.status)
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// Deletes a ticket by ID, returning true if a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds pending tickets whose deadline is strictly before `now`
    ///
    /// This is the sweeper's per-cycle query.
    pub async fn find_overdue_pending(
        pool: &PgPool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM tickets
            WHERE status = 'pending' AND deadline < $1
            ORDER BY deadline ASC
            "#,
        ))
        .bind(now)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }

    /// Transitions a ticket to `missed`
    ///
    /// The WHERE clause re-checks status and deadline, so a ticket the owner
    /// completed between the sweep query and this write is left untouched.
    /// Returns true if the row transitioned.
    pub async fn mark_missed(
        pool: &PgPool,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'missed'
            WHERE id = $1 AND status = 'pending' AND deadline < $2
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether this ticket is pending and past its deadline
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TicketStatus::Pending && self.deadline < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ticket_with(status: TicketStatus, deadline: DateTime<Utc>) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            deadline,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(TicketStatus::Pending.as_str(), "pending");
        assert_eq!(TicketStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TicketStatus::Completed.as_str(), "completed");
        assert_eq!(TicketStatus::Missed.as_str(), "missed");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TicketStatus::Pending.is_terminal());
        assert!(!TicketStatus::InProgress.is_terminal());
        assert!(TicketStatus::Completed.is_terminal());
        assert!(TicketStatus::Missed.is_terminal());
    }

    #[test]
    fn test_owner_edit_transitions() {
        assert!(TicketStatus::Pending.can_edit_to(TicketStatus::InProgress));
        assert!(TicketStatus::Pending.can_edit_to(TicketStatus::Completed));
        assert!(TicketStatus::InProgress.can_edit_to(TicketStatus::Completed));

        // missed belongs to the sweeper
        assert!(!TicketStatus::Pending.can_edit_to(TicketStatus::Missed));
        assert!(!TicketStatus::InProgress.can_edit_to(TicketStatus::Missed));

        // terminal states stay put
        assert!(!TicketStatus::Completed.can_edit_to(TicketStatus::Pending));
        assert!(!TicketStatus::Missed.can_edit_to(TicketStatus::Pending));
        assert!(!TicketStatus::Completed.can_edit_to(TicketStatus::Completed));

        // no going back
        assert!(!TicketStatus::InProgress.can_edit_to(TicketStatus::Pending));
    }

    #[test]
    fn test_noop_edit_allowed_for_active_states() {
        assert!(TicketStatus::Pending.can_edit_to(TicketStatus::Pending));
        assert!(TicketStatus::InProgress.can_edit_to(TicketStatus::InProgress));
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc::now();

        let overdue = ticket_with(TicketStatus::Pending, now - Duration::minutes(5));
        assert!(overdue.is_overdue(now));

        let future = ticket_with(TicketStatus::Pending, now + Duration::minutes(5));
        assert!(!future.is_overdue(now));

        // completed tickets are never overdue, regardless of deadline
        let done = ticket_with(TicketStatus::Completed, now - Duration::days(1));
        assert!(!done.is_overdue(now));

        let missed = ticket_with(TicketStatus::Missed, now - Duration::days(1));
        assert!(!missed.is_overdue(now));
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: TicketStatus = serde_json::from_str("\"missed\"").unwrap();
        assert_eq!(status, TicketStatus::Missed);
    }
}
