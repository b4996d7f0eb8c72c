use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Closed role set. Anything else is rejected at the edge, so no invalid
/// role string ever reaches a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "student" => Some(Role::Student),
            "faculty" => Some(Role::Faculty),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }
}

/// Profile record mirrored from the identity provider; `id` equals the
/// provider's subject id.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Unknown or absent roles fall back to student.
    pub fn resolved_role(&self) -> Role {
        self.role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or(Role::Student)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl User {
    pub async fn create(
        pool: &PgPool,
        id: &str,
        email: &str,
        name: &str,
        role: Role,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, name, role) VALUES ($1, $2, $3, $4) \
             RETURNING id, email, name, role",
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(role)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, name, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, name, role FROM users")
            .fetch_all(pool)
            .await
    }

    pub async fn update_role(pool: &PgPool, id: &str, role: Role) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_the_three_roles() {
        assert_eq!(Role::parse("student"), Some(Role::Student));
        assert_eq!(Role::parse("faculty"), Some(Role::Faculty));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn registration_role_defaults_to_student() {
        let req = RegisterRequest {
            email: "a@x.com".into(),
            password: "p".into(),
            name: "A".into(),
            role: None,
        };
        assert_eq!(req.resolved_role(), Role::Student);

        let req = RegisterRequest {
            role: Some("janitor".into()),
            ..req
        };
        assert_eq!(req.resolved_role(), Role::Student);

        let req = RegisterRequest {
            role: Some("faculty".into()),
            ..req
        };
        assert_eq!(req.resolved_role(), Role::Faculty);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Faculty).unwrap(), "\"faculty\"");
    }
}
