use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBox {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub allow_anonymous: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackBoxRequest {
    pub title: String,
    pub description: String,
    pub allow_anonymous: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeedbackBoxRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub allow_anonymous: Option<bool>,
}

impl FeedbackBox {
    pub async fn create(
        pool: &PgPool,
        req: CreateFeedbackBoxRequest,
        created_by: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, FeedbackBox>(
            "INSERT INTO feedback_boxes \
             (id, title, description, created_by, created_at, is_active, allow_anonymous) \
             VALUES ($1, $2, $3, $4, now(), TRUE, $5) \
             RETURNING id, title, description, created_by, created_at, is_active, allow_anonymous",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.title)
        .bind(&req.description)
        .bind(created_by)
        .bind(req.allow_anonymous.unwrap_or(true))
        .fetch_one(pool)
        .await
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FeedbackBox>(
            "SELECT id, title, description, created_by, created_at, is_active, allow_anonymous \
             FROM feedback_boxes ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FeedbackBox>(
            "SELECT id, title, description, created_by, created_at, is_active, allow_anonymous \
             FROM feedback_boxes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Partial patch; absent fields keep their stored values.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        req: UpdateFeedbackBoxRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, FeedbackBox>(
            "UPDATE feedback_boxes SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             is_active = COALESCE($4, is_active), \
             allow_anonymous = COALESCE($5, allow_anonymous) \
             WHERE id = $1 \
             RETURNING id, title, description, created_by, created_at, is_active, allow_anonymous",
        )
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.is_active)
        .bind(req.allow_anonymous)
        .fetch_one(pool)
        .await
    }

    /// Deletes the box together with every feedback record referencing it, in
    /// one all-or-nothing transaction. The only multi-document mutation in
    /// the system.
    pub async fn delete_cascade(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM feedback WHERE box_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM feedback_boxes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}
