//! Gig queries.

use crate::error::StoreError;
use crate::models::{
    ActivityLogView, ActivityLogWithReview, CategoryRow, ClientWithUser, GigDetailView, GigRow,
    GigView, ReviewView, UserPublic,
};
use crate::Store;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder};
use unigig_core::GigStatus;
use uuid::Uuid;

/// Fields for a new gig.
#[derive(Debug)]
pub struct NewGig<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub budget: f64,
    pub client_id: Uuid,
    pub category_id: Uuid,
}

/// Full replacement of a gig's editable fields.
#[derive(Debug)]
pub struct GigUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub budget: f64,
    pub category_id: Uuid,
}

/// Optional list filters, straight from the query string.
#[derive(Debug, Default)]
pub struct GigFilter {
    pub status: Option<GigStatus>,
    pub search: Option<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
}

/// The slice of an open gig the apply flow needs.
#[derive(Debug, FromRow)]
pub struct OpenGig {
    pub id: Uuid,
    pub title: String,
    pub client_user_id: Uuid,
}

const SELECT_VIEW: &str = "SELECT g.id, g.title, g.description, g.budget, g.status, \
     g.client_id, g.category_id, g.created_at, g.updated_at, \
     cl.user_id AS client_user_id, cl.company, \
     u.name AS user_name, u.email AS user_email, \
     c.name AS category_name, c.description AS category_description \
     FROM gigs g \
     JOIN clients cl ON cl.id = g.client_id \
     JOIN users u ON u.id = cl.user_id \
     JOIN categories c ON c.id = g.category_id";

#[derive(Debug, FromRow)]
struct GigJoinRow {
    id: Uuid,
    title: String,
    description: String,
    budget: f64,
    status: String,
    client_id: Uuid,
    category_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    client_user_id: Uuid,
    company: Option<String>,
    user_name: String,
    user_email: String,
    category_name: String,
    category_description: String,
}

impl From<GigJoinRow> for GigView {
    fn from(r: GigJoinRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            budget: r.budget,
            status: r.status,
            client_id: r.client_id,
            category_id: r.category_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
            client: ClientWithUser {
                id: r.client_id,
                user_id: r.client_user_id,
                company: r.company,
                user: UserPublic {
                    name: r.user_name,
                    email: r.user_email,
                },
            },
            category: CategoryRow {
                id: r.category_id,
                name: r.category_name,
                description: r.category_description,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct ActivityReviewRow {
    id: Uuid,
    action: String,
    user_id: Uuid,
    gig_id: Uuid,
    created_at: DateTime<Utc>,
    review_id: Option<Uuid>,
    rating: Option<i32>,
    comment: Option<String>,
    review_created_at: Option<DateTime<Utc>>,
}

impl From<ActivityReviewRow> for ActivityLogWithReview {
    fn from(r: ActivityReviewRow) -> Self {
        let review = r.review_id.map(|review_id| ReviewView {
            id: review_id,
            rating: r.rating.unwrap_or_default(),
            comment: r.comment.clone(),
            activity_log_id: r.id,
            created_at: r.review_created_at.unwrap_or(r.created_at),
        });
        Self {
            log: ActivityLogView {
                id: r.id,
                action: r.action,
                user_id: r.user_id,
                gig_id: r.gig_id,
                created_at: r.created_at,
            },
            review,
        }
    }
}

impl Store {
    pub async fn create_gig(&self, new: NewGig<'_>) -> Result<Uuid, StoreError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO gigs (id, title, description, budget, status, client_id, category_id) \
             VALUES ($1, $2, $3, $4, 'OPEN', $5, $6) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(new.title)
        .bind(new.description)
        .bind(new.budget)
        .bind(new.client_id)
        .bind(new.category_id)
        .fetch_one(self.pool())
        .await?;
        Ok(id)
    }

    pub async fn gig_view(&self, id: Uuid) -> Result<Option<GigView>, StoreError> {
        let sql = format!("{SELECT_VIEW} WHERE g.id = $1");
        let row = sqlx::query_as::<_, GigJoinRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn list_gigs(&self, filter: GigFilter) -> Result<Vec<GigView>, StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(SELECT_VIEW);
        qb.push(" WHERE TRUE");

        if let Some(status) = filter.status {
            qb.push(" AND g.status = ").push_bind(status.as_str());
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            qb.push(" AND (g.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR g.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(min) = filter.min_budget {
            qb.push(" AND g.budget >= ").push_bind(min);
        }
        if let Some(max) = filter.max_budget {
            qb.push(" AND g.budget <= ").push_bind(max);
        }
        qb.push(" ORDER BY g.created_at DESC");

        let rows: Vec<GigJoinRow> = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Gig detail with the activity trail (and any reviews) inlined.
    pub async fn gig_detail(&self, id: Uuid) -> Result<Option<GigDetailView>, StoreError> {
        let Some(gig) = self.gig_view(id).await? else {
            return Ok(None);
        };

        let logs = sqlx::query_as::<_, ActivityReviewRow>(
            "SELECT a.id, a.action, a.user_id, a.gig_id, a.created_at, \
             r.id AS review_id, r.rating, r.comment, r.created_at AS review_created_at \
             FROM activity_logs a \
             LEFT JOIN reviews r ON r.activity_log_id = a.id \
             WHERE a.gig_id = $1 \
             ORDER BY a.created_at DESC",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await?;

        Ok(Some(GigDetailView {
            gig,
            activity_logs: logs.into_iter().map(Into::into).collect(),
        }))
    }

    /// Ownership predicate: the gig, if it belongs to `user_id`'s client
    /// profile.
    pub async fn find_gig_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GigRow>, StoreError> {
        let row = sqlx::query_as::<_, GigRow>(
            "SELECT g.* FROM gigs g \
             JOIN clients cl ON cl.id = g.client_id \
             WHERE g.id = $1 AND cl.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// The gig, if it exists and is still open for applications.
    pub async fn find_open_gig(&self, id: Uuid) -> Result<Option<OpenGig>, StoreError> {
        let row = sqlx::query_as::<_, OpenGig>(
            "SELECT g.id, g.title, cl.user_id AS client_user_id \
             FROM gigs g \
             JOIN clients cl ON cl.id = g.client_id \
             WHERE g.id = $1 AND g.status = 'OPEN'",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// Status-change predicate: the owning client, or a student who has
    /// applied to the gig.
    pub async fn can_manage_gig_status(
        &self,
        gig_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        let allowed: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
                SELECT 1 FROM gigs g \
                JOIN clients cl ON cl.id = g.client_id \
                WHERE g.id = $1 AND cl.user_id = $2 \
             ) OR EXISTS( \
                SELECT 1 FROM activity_logs a \
                JOIN students st ON st.user_id = a.user_id \
                WHERE a.gig_id = $1 AND a.user_id = $2 AND a.action = 'STUDENT_APPLIED' \
             )",
        )
        .bind(gig_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;
        Ok(allowed)
    }

    pub async fn update_gig(&self, id: Uuid, update: GigUpdate<'_>) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE gigs SET title = $2, description = $3, budget = $4, category_id = $5, \
             updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.budget)
        .bind(update.category_id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn set_gig_status(&self, id: Uuid, status: GigStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE gigs SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Delete a gig together with its activity trail (and any reviews hanging
    /// off it). The trail references the gig, so it goes first.
    pub async fn delete_gig(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool().begin().await?;
        sqlx::query(
            "DELETE FROM reviews WHERE activity_log_id IN \
             (SELECT id FROM activity_logs WHERE gig_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM activity_logs WHERE gig_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM gigs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
