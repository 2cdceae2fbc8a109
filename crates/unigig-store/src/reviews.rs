//! Review queries.

use crate::error::StoreError;
use crate::models::{ActivityLogView, ActivityLogWithUser, ReviewView, ReviewWithActivity, UserPublic};
use crate::Store;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct ReviewJoinRow {
    id: Uuid,
    rating: i32,
    comment: Option<String>,
    activity_log_id: Uuid,
    created_at: DateTime<Utc>,
    action: String,
    log_user_id: Uuid,
    gig_id: Uuid,
    log_created_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
}

impl From<ReviewJoinRow> for ReviewWithActivity {
    fn from(r: ReviewJoinRow) -> Self {
        Self {
            review: ReviewView {
                id: r.id,
                rating: r.rating,
                comment: r.comment,
                activity_log_id: r.activity_log_id,
                created_at: r.created_at,
            },
            activity_log: ActivityLogWithUser {
                log: ActivityLogView {
                    id: r.activity_log_id,
                    action: r.action,
                    user_id: r.log_user_id,
                    gig_id: r.gig_id,
                    created_at: r.log_created_at,
                },
                user: UserPublic {
                    name: r.user_name,
                    email: r.user_email,
                },
            },
        }
    }
}

const SELECT_VIEW: &str = "SELECT r.id, r.rating, r.comment, r.activity_log_id, r.created_at, \
     a.action, a.user_id AS log_user_id, a.gig_id, a.created_at AS log_created_at, \
     u.name AS user_name, u.email AS user_email \
     FROM reviews r \
     JOIN activity_logs a ON a.id = r.activity_log_id \
     JOIN users u ON u.id = a.user_id";

impl Store {
    /// Insert a review. A second review for the same activity log hits the
    /// unique constraint and surfaces as [`StoreError::Conflict`].
    pub async fn create_review(
        &self,
        rating: i32,
        comment: Option<&str>,
        activity_log_id: Uuid,
    ) -> Result<ReviewWithActivity, StoreError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO reviews (id, rating, comment, activity_log_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(rating)
        .bind(comment)
        .bind(activity_log_id)
        .fetch_one(self.pool())
        .await?;

        let sql = format!("{SELECT_VIEW} WHERE r.id = $1");
        let row = sqlx::query_as::<_, ReviewJoinRow>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        Ok(row.into())
    }

    /// Reviews attached to a gig's activity trail, newest first.
    pub async fn reviews_for_gig(&self, gig_id: Uuid) -> Result<Vec<ReviewWithActivity>, StoreError> {
        let sql = format!("{SELECT_VIEW} WHERE a.gig_id = $1 ORDER BY r.created_at DESC");
        let rows = sqlx::query_as::<_, ReviewJoinRow>(&sql)
            .bind(gig_id)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
