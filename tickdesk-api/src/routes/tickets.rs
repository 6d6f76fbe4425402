/// Ticket endpoints
///
/// Owner-side CRUD for deadline-bound work items. Every route is behind the
/// bearer gate and scoped to the authenticated owner: listing returns only
/// the caller's tickets, and edits or deletes of someone else's ticket fail
/// with 403.
///
/// Status edits go through the owner state machine — `missed` can never be
/// set here; that transition belongs to the expiry sweeper.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tickdesk_shared::{
    auth::{authorization::require_ownership, middleware::AuthContext},
    models::ticket::{CreateTicket, Ticket, TicketStatus, UpdateTicket},
};
use uuid::Uuid;
use validator::Validate;

/// Create-ticket request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Deadline; may be in the past, in which case the next sweep will
    /// mark the ticket missed
    pub deadline: DateTime<Utc>,
}

/// Update-ticket request; only present fields are changed
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTicketRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    pub deadline: Option<DateTime<Utc>>,

    pub status: Option<TicketStatus>,
}

/// Single-ticket response
#[derive(Debug, Serialize, Deserialize)]
pub struct TicketResponse {
    pub success: bool,
    pub data: Ticket,
}

/// Ticket-list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TicketListResponse {
    pub success: bool,
    pub data: Vec<Ticket>,
}

/// Lists the caller's tickets, newest first
pub async fn list_tickets(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TicketListResponse>> {
    let tickets = Ticket::list_by_owner(&state.db, auth.user_id).await?;

    Ok(Json(TicketListResponse {
        success: true,
        data: tickets,
    }))
}

/// Creates a ticket owned by the caller, status `pending`
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<TicketResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let ticket = Ticket::create(
        &state.db,
        CreateTicket {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
            deadline: req.deadline,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(TicketResponse {
            success: true,
            data: ticket,
        }),
    ))
}

/// Applies an owner edit to a ticket
///
/// # Errors
///
/// - `404 Not Found`: no such ticket
/// - `403 Forbidden`: caller does not own the ticket
/// - `400 Bad Request`: the requested status change is not a legal owner
///   transition (terminal states stay put, `missed` is sweeper-only)
pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTicketRequest>,
) -> ApiResult<Json<TicketResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let ticket = Ticket::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    require_ownership(&auth, ticket.owner_id)?;

    if let Some(target) = req.status {
        if !ticket.status.can_edit_to(target) {
            return Err(ApiError::BadRequest(format!(
                "Cannot change status from {} to {}",
                ticket.status.as_str(),
                target.as_str()
            )));
        }
    }

    let updated = Ticket::update(
        &state.db,
        id,
        UpdateTicket {
            title: req.title,
            description: req.description,
            deadline: req.deadline,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    Ok(Json(TicketResponse {
        success: true,
        data: updated,
    }))
}

/// Deletes a ticket owned by the caller
pub async fn delete_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<super::auth::MessageResponse>> {
    let ticket = Ticket::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    require_ownership(&auth, ticket.owner_id)?;

    Ticket::delete(&state.db, id).await?;

    Ok(Json(super::auth::MessageResponse {
        success: true,
        message: "Ticket deleted successfully".to_string(),
    }))
}
