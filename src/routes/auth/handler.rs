use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};

use crate::{
    AppState, identity,
    error::AppError,
    middleware::AuthUser,
    session::SessionContext,
};

use super::model::{LoginRequest, MessageResponse, RegisterRequest, User};

/// Creates an identity-provider account, then mirrors the profile record.
/// The two writes are deliberately not transactional: if the mirror write
/// fails the account is left behind, the accepted registration gap.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    if req.email.is_empty() || req.password.is_empty() || req.name.is_empty() {
        return Err(AppError::Validation(
            "Email, password, and name are required".into(),
        ));
    }

    let role = req.resolved_role();

    let subject_id = identity::create_account(&state.pool, &req.email, &req.password, &req.name)
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to register user: {}", e)))?;

    let user = User::create(&state.pool, &subject_id, &req.email, &req.name, role).await?;

    tracing::info!("registered user {} as {}", user.id, role.as_str());
    Ok((StatusCode::CREATED, Json(user)))
}

/// Verifies the supplied id-token and links the current session to the
/// authenticated subject.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    session: Option<Extension<SessionContext>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    if req.id_token.is_empty() {
        return Err(AppError::Validation("ID token is required".into()));
    }

    let claims = identity::verify_id_token(&req.id_token, &state.config)?;

    let user = User::find_by_id(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if let Some(Extension(session)) = session {
        state.sessions.link(&session.id, &user.id, user.role).await?;
    }

    Ok(Json(user))
}

/// Resets the session to anonymous. Succeeds whether or not the session was
/// linked.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    session: Option<Extension<SessionContext>>,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(Extension(session)) = session {
        state.sessions.unlink(&session.id).await?;
    }

    Ok(Json(MessageResponse {
        message: "Logged out successfully".into(),
    }))
}

#[axum::debug_handler]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = User::find_by_id(&state.pool, &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(user))
}
