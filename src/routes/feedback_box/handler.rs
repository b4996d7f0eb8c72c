use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    middleware::{AuthUser, require_faculty_or_admin},
    routes::auth::model::Role,
};

use super::model::{CreateFeedbackBoxRequest, FeedbackBox, UpdateFeedbackBoxRequest};

#[axum::debug_handler]
pub async fn create_feedback_box(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateFeedbackBoxRequest>,
) -> Result<(StatusCode, Json<FeedbackBox>), AppError> {
    require_faculty_or_admin(&user)?;

    if req.title.is_empty() || req.description.is_empty() {
        return Err(AppError::Validation(
            "Title and description are required".into(),
        ));
    }

    let feedback_box = FeedbackBox::create(&state.pool, req, &user.id).await?;
    Ok((StatusCode::CREATED, Json(feedback_box)))
}

#[axum::debug_handler]
pub async fn get_all_feedback_boxes(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedbackBox>>, AppError> {
    Ok(Json(FeedbackBox::find_all(&state.pool).await?))
}

#[axum::debug_handler]
pub async fn get_feedback_box(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FeedbackBox>, AppError> {
    let feedback_box = FeedbackBox::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Feedback box not found".into()))?;

    Ok(Json(feedback_box))
}

#[axum::debug_handler]
pub async fn update_feedback_box(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateFeedbackBoxRequest>,
) -> Result<Json<FeedbackBox>, AppError> {
    require_faculty_or_admin(&user)?;

    let feedback_box = FeedbackBox::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Feedback box not found".into()))?;

    require_owner_or_admin(&feedback_box, &user, "update")?;

    let updated = FeedbackBox::update(&state.pool, &id, req).await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_feedback_box(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_faculty_or_admin(&user)?;

    let feedback_box = FeedbackBox::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Feedback box not found".into()))?;

    require_owner_or_admin(&feedback_box, &user, "delete")?;

    FeedbackBox::delete_cascade(&state.pool, &id).await?;

    tracing::info!("deleted feedback box {} and its feedback", id);
    Ok(Json(
        serde_json::json!({ "message": "Feedback box deleted successfully" }),
    ))
}

fn require_owner_or_admin(
    feedback_box: &FeedbackBox,
    user: &AuthUser,
    action: &str,
) -> Result<(), AppError> {
    if feedback_box.created_by != user.id && user.role != Role::Admin {
        return Err(AppError::Forbidden(format!(
            "Not authorized to {} this feedback box",
            action
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_box(created_by: &str) -> FeedbackBox {
        FeedbackBox {
            id: "box-1".into(),
            title: "Course feedback".into(),
            description: "Tell us".into(),
            created_by: created_by.into(),
            created_at: Utc::now(),
            is_active: false,
            allow_anonymous: true,
        }
    }

    fn caller(id: &str, role: Role) -> AuthUser {
        AuthUser {
            id: id.into(),
            email: "a@x.com".into(),
            role,
        }
    }

    #[test]
    fn owner_may_touch_their_box() {
        let b = sample_box("user-1");
        assert!(require_owner_or_admin(&b, &caller("user-1", Role::Faculty), "update").is_ok());
    }

    #[test]
    fn admin_may_touch_any_box() {
        let b = sample_box("user-1");
        assert!(require_owner_or_admin(&b, &caller("user-2", Role::Admin), "delete").is_ok());
    }

    #[test]
    fn other_faculty_is_forbidden_even_for_inactive_boxes() {
        let b = sample_box("user-1");
        assert!(matches!(
            require_owner_or_admin(&b, &caller("user-2", Role::Faculty), "update"),
            Err(AppError::Forbidden(_))
        ));
    }
}
