use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::routes::auth::model::{Role, User};
use crate::routes::feedback::model::Feedback;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub faculty: usize,
    pub students: usize,
    pub admins: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FeedbackBoxStats {
    pub total: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FeedbackStats {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub anonymous: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub users: UserStats,
    pub feedback_boxes: FeedbackBoxStats,
    pub feedback: FeedbackStats,
}

impl DashboardStats {
    /// Aggregates full scans of the user and feedback collections plus a
    /// count-only box total. Correct only while collections stay small enough
    /// to enumerate; there is no pagination.
    pub fn compute(users: &[User], feedback: &[Feedback], box_total: i64) -> Self {
        let faculty = users.iter().filter(|u| u.role == Role::Faculty).count();
        let students = users.iter().filter(|u| u.role == Role::Student).count();
        let admins = users.iter().filter(|u| u.role == Role::Admin).count();

        let approved = feedback.iter().filter(|f| f.is_approved).count();
        let anonymous = feedback.iter().filter(|f| f.is_anonymous).count();

        DashboardStats {
            users: UserStats {
                total: faculty + students + admins,
                faculty,
                students,
                admins,
            },
            feedback_boxes: FeedbackBoxStats { total: box_total },
            feedback: FeedbackStats {
                total: feedback.len(),
                approved,
                pending: feedback.len() - approved,
                anonymous,
            },
        }
    }
}

pub async fn count_feedback_boxes(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedback_boxes")
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.into(),
            email: format!("{}@x.com", id),
            name: id.into(),
            role,
        }
    }

    fn feedback(approved: bool, anonymous: bool) -> Feedback {
        Feedback {
            id: "f".into(),
            box_id: "b".into(),
            content: "hi".into(),
            submitted_by: None,
            submitted_at: Utc::now(),
            is_approved: approved,
            is_anonymous: anonymous,
            session_id: None,
        }
    }

    #[test]
    fn aggregates_counts_by_role_and_status() {
        let users = vec![
            user("a", Role::Admin),
            user("f1", Role::Faculty),
            user("f2", Role::Faculty),
            user("s", Role::Student),
        ];
        let feedback = vec![
            feedback(true, false),
            feedback(false, true),
            feedback(false, false),
        ];

        let stats = DashboardStats::compute(&users, &feedback, 7);

        assert_eq!(
            stats.users,
            UserStats {
                total: 4,
                faculty: 2,
                students: 1,
                admins: 1
            }
        );
        assert_eq!(stats.feedback_boxes, FeedbackBoxStats { total: 7 });
        assert_eq!(
            stats.feedback,
            FeedbackStats {
                total: 3,
                approved: 1,
                pending: 2,
                anonymous: 1
            }
        );
    }

    #[test]
    fn empty_collections_produce_zeroes() {
        let stats = DashboardStats::compute(&[], &[], 0);
        assert_eq!(stats.users.total, 0);
        assert_eq!(stats.feedback.total, 0);
        assert_eq!(stats.feedback.pending, 0);
    }
}
