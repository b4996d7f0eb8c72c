use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::session::SessionContext;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub box_id: String,
    pub content: String,
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub is_approved: bool,
    pub is_anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    pub box_id: String,
    pub content: String,
    pub is_anonymous: Option<bool>,
}

/// Who a piece of feedback is attributed to. Anonymous submissions never
/// carry a user id; unauthenticated non-anonymous submissions are tracked by
/// session instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitter {
    Identified(String),
    SessionTracked(String),
    Anonymous,
}

impl Submitter {
    pub fn resolve(
        is_anonymous: bool,
        user: Option<&AuthUser>,
        session: Option<&SessionContext>,
    ) -> Submitter {
        if is_anonymous {
            return Submitter::Anonymous;
        }
        if let Some(user) = user {
            return Submitter::Identified(user.id.clone());
        }
        if let Some(session) = session {
            return Submitter::SessionTracked(session.id.clone());
        }
        Submitter::Anonymous
    }

    /// The value stored (and served) as `submittedBy`: only an identified
    /// submitter exposes a user id.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Submitter::Identified(id) => Some(id),
            _ => None,
        }
    }
}

impl Feedback {
    pub async fn create(
        pool: &PgPool,
        req: &SubmitFeedbackRequest,
        submitter: &Submitter,
        session_id: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedback \
             (id, box_id, content, submitted_by, submitted_at, is_approved, is_anonymous, session_id) \
             VALUES ($1, $2, $3, $4, now(), FALSE, $5, $6) \
             RETURNING id, box_id, content, submitted_by, submitted_at, is_approved, is_anonymous, session_id",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.box_id)
        .bind(&req.content)
        .bind(submitter.user_id())
        .bind(req.is_anonymous.unwrap_or(false))
        .bind(session_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_box(pool: &PgPool, box_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Feedback>(
            "SELECT id, box_id, content, submitted_by, submitted_at, is_approved, is_anonymous, session_id \
             FROM feedback WHERE box_id = $1 ORDER BY submitted_at DESC",
        )
        .bind(box_id)
        .fetch_all(pool)
        .await
    }

    /// Scan used by the admin dashboard.
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Feedback>(
            "SELECT id, box_id, content, submitted_by, submitted_at, is_approved, is_anonymous, session_id \
             FROM feedback",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn approve(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE feedback SET is_approved = TRUE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::auth::model::Role;
    use chrono::Utc;

    fn user() -> AuthUser {
        AuthUser {
            id: "user-1".into(),
            email: "a@x.com".into(),
            role: Role::Student,
        }
    }

    fn session() -> SessionContext {
        SessionContext {
            id: "session-1".into(),
            created_at: Utc::now(),
            last_accessed: Utc::now(),
            is_anonymous: true,
            user_id: None,
            role: None,
        }
    }

    #[test]
    fn anonymous_request_never_carries_a_user_id() {
        let submitter = Submitter::resolve(true, Some(&user()), Some(&session()));
        assert_eq!(submitter, Submitter::Anonymous);
        assert_eq!(submitter.user_id(), None);
    }

    #[test]
    fn authenticated_caller_is_identified() {
        let submitter = Submitter::resolve(false, Some(&user()), Some(&session()));
        assert_eq!(submitter, Submitter::Identified("user-1".into()));
        assert_eq!(submitter.user_id(), Some("user-1"));
    }

    #[test]
    fn unauthenticated_caller_is_tracked_by_session() {
        let submitter = Submitter::resolve(false, None, Some(&session()));
        assert_eq!(submitter, Submitter::SessionTracked("session-1".into()));
        assert_eq!(submitter.user_id(), None);
    }

    #[test]
    fn no_user_and_no_session_falls_back_to_anonymous() {
        let submitter = Submitter::resolve(false, None, None);
        assert_eq!(submitter, Submitter::Anonymous);
    }
}
