use axum::extract::{Json, Path, State};

use crate::{
    AppState,
    error::AppError,
    middleware::{AuthUser, require_admin},
    routes::auth::model::{MessageResponse, Role, User},
    routes::feedback::model::Feedback,
};

use super::model::{DashboardStats, UpdateRoleRequest, count_feedback_boxes};

#[axum::debug_handler]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    require_admin(&user)?;

    let users = User::find_all(&state.pool).await?;
    let feedback = Feedback::find_all(&state.pool).await?;
    let box_total = count_feedback_boxes(&state.pool).await?;

    Ok(Json(DashboardStats::compute(&users, &feedback, box_total)))
}

#[axum::debug_handler]
pub async fn get_all_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    require_admin(&user)?;

    Ok(Json(User::find_all(&state.pool).await?))
}

#[axum::debug_handler]
pub async fn update_user_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&user)?;

    // Reject anything outside the closed role set before touching the store.
    let role = Role::parse(&req.role).ok_or_else(|| AppError::Validation("Invalid role".into()))?;

    let affected = User::update_role(&state.pool, &user_id, role).await?;
    if affected == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    tracing::info!("user {} role changed to {}", user_id, role.as_str());
    Ok(Json(MessageResponse {
        message: format!("User role updated to {}", role.as_str()),
    }))
}
