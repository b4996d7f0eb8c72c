//! Access guard: resolves the bearer token into a caller identity, plus the
//! pure role gates used by handlers.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{HeaderMap, header::AUTHORIZATION, request::Parts};

use crate::error::AppError;
use crate::identity;
use crate::routes::auth::model::{Role, User};
use crate::AppState;

/// Caller identity attached by the guard: verified subject resolved against
/// the profile directory.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<AuthUser, AppError> {
    let token = bearer_token(&parts.headers)
        .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?;

    let claims = identity::verify_id_token(token, &state.config)?;

    // A valid token without a mirrored profile is rejected, never
    // auto-provisioned.
    let user = User::find_by_id(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    Ok(AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await
    }
}

/// Optional flavor for routes open to unauthenticated callers: a missing or
/// invalid token yields `None` instead of rejecting.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if bearer_token(&parts.headers).is_none() {
            return Ok(None);
        }
        Ok(resolve(parts, state).await.ok())
    }
}

pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    match user.role {
        Role::Admin => Ok(()),
        _ => Err(AppError::Forbidden("Access denied. Admin only.".into())),
    }
}

pub fn require_faculty_or_admin(user: &AuthUser) -> Result<(), AppError> {
    match user.role {
        Role::Faculty | Role::Admin => Ok(()),
        Role::Student => Err(AppError::Forbidden("Access denied. Faculty only.".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn caller(role: Role) -> AuthUser {
        AuthUser {
            id: "user-1".into(),
            email: "a@x.com".into(),
            role,
        }
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    }

    #[test]
    fn admin_gate_admits_only_admins() {
        assert!(require_admin(&caller(Role::Admin)).is_ok());
        assert!(matches!(
            require_admin(&caller(Role::Faculty)),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            require_admin(&caller(Role::Student)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn faculty_gate_admits_faculty_and_admins() {
        assert!(require_faculty_or_admin(&caller(Role::Faculty)).is_ok());
        assert!(require_faculty_or_admin(&caller(Role::Admin)).is_ok());
        assert!(matches!(
            require_faculty_or_admin(&caller(Role::Student)),
            Err(AppError::Forbidden(_))
        ));
    }
}
