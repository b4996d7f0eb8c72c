//! Session manager: anonymous-session issuance, lookup, and the
//! anonymous -> linked -> anonymous transitions driven by login and logout.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::routes::auth::model::Role;

/// Per-request session identity, mirrored from the backing record.
///
/// Invariant: `is_anonymous == user_id.is_none()` at every observation point.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub is_anonymous: bool,
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl SessionContext {
    pub fn link(&mut self, user_id: String, role: Role) {
        self.user_id = Some(user_id);
        self.role = Some(role);
        self.is_anonymous = false;
    }

    pub fn unlink(&mut self) {
        self.user_id = None;
        self.role = None;
        self.is_anonymous = true;
    }
}

/// Store handle for session records. Injected through `AppState` rather than
/// reached through any global.
#[derive(Clone)]
pub struct SessionStore {
    pool: PgPool,
}

impl SessionStore {
    pub fn new(pool: PgPool) -> Self {
        SessionStore { pool }
    }

    /// Looks up the referenced session, refreshing `last_accessed`, or creates
    /// a fresh anonymous one when the reference is absent or stale. The bool
    /// reports whether a new record was created (the caller then issues the
    /// cookie).
    pub async fn load_or_create(
        &self,
        existing_id: Option<&str>,
    ) -> Result<(SessionContext, bool), AppError> {
        if let Some(id) = existing_id {
            let found = sqlx::query_as::<_, SessionContext>(
                "UPDATE sessions SET last_accessed = now() WHERE id = $1 \
                 RETURNING id, created_at, last_accessed, is_anonymous, user_id, role",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(session) = found {
                return Ok((session, false));
            }
        }

        let session = sqlx::query_as::<_, SessionContext>(
            "INSERT INTO sessions (id, created_at, last_accessed, is_anonymous) \
             VALUES ($1, now(), now(), TRUE) \
             RETURNING id, created_at, last_accessed, is_anonymous, user_id, role",
        )
        .bind(Uuid::new_v4().to_string())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("created anonymous session {}", session.id);
        Ok((session, true))
    }

    /// Unconditionally links the session record to an authenticated subject.
    /// Invoked exactly once, on successful login.
    pub async fn link(&self, session_id: &str, user_id: &str, role: Role) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE sessions SET user_id = $2, role = $3, is_anonymous = FALSE WHERE id = $1",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Resets the record to anonymous. Idempotent: unlinking an already
    /// anonymous session is a no-op.
    pub async fn unlink(&self, session_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE sessions SET user_id = NULL, role = NULL, is_anonymous = TRUE WHERE id = $1",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn store_anonymous_token(
        &self,
        session_id: &str,
        token: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE sessions SET anonymous_token = $2, token_created_at = now() WHERE id = $1",
        )
        .bind(session_id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous_context() -> SessionContext {
        SessionContext {
            id: "session-1".into(),
            created_at: Utc::now(),
            last_accessed: Utc::now(),
            is_anonymous: true,
            user_id: None,
            role: None,
        }
    }

    fn invariant_holds(ctx: &SessionContext) -> bool {
        ctx.is_anonymous == ctx.user_id.is_none()
    }

    #[test]
    fn link_attaches_subject_and_clears_anonymity() {
        let mut ctx = anonymous_context();
        assert!(invariant_holds(&ctx));

        ctx.link("user-1".into(), Role::Faculty);
        assert!(!ctx.is_anonymous);
        assert_eq!(ctx.user_id.as_deref(), Some("user-1"));
        assert_eq!(ctx.role, Some(Role::Faculty));
        assert!(invariant_holds(&ctx));
    }

    #[test]
    fn unlink_returns_to_anonymous() {
        let mut ctx = anonymous_context();
        ctx.link("user-1".into(), Role::Student);
        ctx.unlink();

        assert!(ctx.is_anonymous);
        assert!(ctx.user_id.is_none());
        assert!(ctx.role.is_none());
        assert!(invariant_holds(&ctx));
    }

    #[test]
    fn unlink_is_idempotent() {
        let mut ctx = anonymous_context();
        ctx.unlink();
        ctx.unlink();
        assert!(ctx.is_anonymous);
        assert!(invariant_holds(&ctx));
    }

    #[test]
    fn relink_after_logout_is_allowed() {
        let mut ctx = anonymous_context();
        ctx.link("user-1".into(), Role::Student);
        ctx.unlink();
        ctx.link("user-2".into(), Role::Admin);
        assert_eq!(ctx.user_id.as_deref(), Some("user-2"));
        assert_eq!(ctx.role, Some(Role::Admin));
        assert!(invariant_holds(&ctx));
    }
}
