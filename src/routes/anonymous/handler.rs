use axum::{Extension, extract::{Json, State}};
use uuid::Uuid;

use crate::{AppState, error::AppError, session::SessionContext};

use super::model::AnonymousTokenResponse;

/// Mints a throwaway token tied to the caller's session, for anonymous
/// submitters that still need a stable handle within the session.
#[axum::debug_handler]
pub async fn get_anonymous_token(
    State(state): State<AppState>,
    session: Option<Extension<SessionContext>>,
) -> Result<Json<AnonymousTokenResponse>, AppError> {
    let Some(Extension(session)) = session else {
        return Err(AppError::Validation("No session available".into()));
    };

    let anonymous_token = Uuid::new_v4().to_string();
    state
        .sessions
        .store_anonymous_token(&session.id, &anonymous_token)
        .await?;

    Ok(Json(AnonymousTokenResponse { anonymous_token }))
}
