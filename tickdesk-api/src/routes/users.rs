/// User management endpoints (admin only)
///
/// The administrative surface behind the role gate: a paginated,
/// name-searchable listing of accounts, and the activate/deactivate status
/// toggle that locks an account out of login.
///
/// Both handlers require the `admin` role on the authenticated identity; a
/// plain `user` token fails 403.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tickdesk_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::user::User,
};
use uuid::Uuid;
use validator::Validate;

/// User-list request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    /// 1-based page number
    #[validate(range(min = 1, message = "currentPage must be at least 1"))]
    pub current_page: i64,

    #[validate(range(min = 1, max = 100, message = "itemsPerPage must be 1-100"))]
    pub items_per_page: i64,

    /// Optional case-insensitive name filter
    pub search: Option<String>,
}

/// Pagination block for list responses
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_count: i64,
    pub total_pages: i64,
}

/// User-list response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub success: bool,
    pub data: Vec<User>,
    pub pagination: Pagination,
}

/// Toggle-status query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatusQuery {
    pub user_id: Uuid,
}

/// Toggle-status response
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleStatusResponse {
    pub success: bool,
    pub message: String,
    pub data: User,
}

/// Lists users with pagination and optional name search
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ListUsersRequest>,
) -> ApiResult<Json<UserListResponse>> {
    require_admin(&auth)?;
    req.validate().map_err(ApiError::from_validation)?;

    let keyword = req.search.as_deref().filter(|s| !s.is_empty());
    let offset = (req.current_page - 1) * req.items_per_page;

    let users = User::search(&state.db, keyword, req.items_per_page, offset).await?;
    let total_count = User::count(&state.db, keyword).await?;

    let total_pages = (total_count + req.items_per_page - 1) / req.items_per_page;

    Ok(Json(UserListResponse {
        success: true,
        data: users,
        pagination: Pagination {
            total_count,
            total_pages,
        },
    }))
}

/// Flips an account between active and inactive
///
/// An inactive account cannot log in; tokens it already holds stay valid
/// until they expire (sessions are stateless and not tracked server-side).
pub async fn toggle_user_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ToggleStatusQuery>,
) -> ApiResult<Json<ToggleStatusResponse>> {
    require_admin(&auth)?;

    let user = User::find_by_id(&state.db, query.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let updated = User::set_status(&state.db, user.id, user.status.toggled())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ToggleStatusResponse {
        success: true,
        message: "User status updated successfully".to_string(),
        data: updated,
    }))
}
