use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    middleware::{AuthUser, require_admin},
    routes::auth::model::MessageResponse,
    routes::feedback_box::model::FeedbackBox,
    session::SessionContext,
};

use super::model::{Feedback, SubmitFeedbackRequest, Submitter};

/// Open to everyone: authenticated users, session-tracked visitors, and (when
/// the box allows it) fully anonymous submitters. Every record starts
/// unapproved.
#[axum::debug_handler]
pub async fn submit_feedback(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    session: Option<Extension<SessionContext>>,
    Json(req): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>), AppError> {
    if req.box_id.is_empty() || req.content.is_empty() {
        return Err(AppError::Validation(
            "Box ID and content are required".into(),
        ));
    }

    let feedback_box = FeedbackBox::find_by_id(&state.pool, &req.box_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Feedback box not found".into()))?;

    if !feedback_box.is_active {
        return Err(AppError::Validation("Feedback box is not active".into()));
    }

    let is_anonymous = req.is_anonymous.unwrap_or(false);
    if is_anonymous && !feedback_box.allow_anonymous {
        return Err(AppError::Validation(
            "Anonymous feedback is not allowed for this box".into(),
        ));
    }

    let session = session.map(|Extension(s)| s);
    let submitter = Submitter::resolve(is_anonymous, user.as_ref(), session.as_ref());

    // The session id is recorded alongside regardless of attribution, for
    // spam tracing.
    let feedback = Feedback::create(
        &state.pool,
        &req,
        &submitter,
        session.as_ref().map(|s| s.id.as_str()),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

#[axum::debug_handler]
pub async fn get_feedback_by_box(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(box_id): Path<String>,
) -> Result<Json<Vec<Feedback>>, AppError> {
    Ok(Json(Feedback::find_by_box(&state.pool, &box_id).await?))
}

#[axum::debug_handler]
pub async fn approve_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&user)?;

    let affected = Feedback::approve(&state.pool, &id).await?;
    if affected == 0 {
        return Err(AppError::NotFound("Feedback not found".into()));
    }

    Ok(Json(MessageResponse {
        message: "Feedback approved".into(),
    }))
}

#[axum::debug_handler]
pub async fn delete_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&user)?;

    let affected = Feedback::delete(&state.pool, &id).await?;
    if affected == 0 {
        return Err(AppError::NotFound("Feedback not found".into()));
    }

    Ok(Json(MessageResponse {
        message: "Feedback deleted successfully".into(),
    }))
}
