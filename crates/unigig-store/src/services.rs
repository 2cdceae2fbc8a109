//! Service listing queries.

use crate::error::StoreError;
use crate::models::{CategoryRow, ServiceRow, ServiceView, StudentWithUser, UserPublic};
use crate::Store;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder};
use uuid::Uuid;

/// Fields for a new service listing.
#[derive(Debug)]
pub struct NewService<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub student_id: Uuid,
    pub category_id: Uuid,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct ServicePatch<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<f64>,
    pub category_id: Option<Uuid>,
}

/// Optional list filters, straight from the query string.
#[derive(Debug, Default)]
pub struct ServiceFilter {
    pub category: Option<Uuid>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

const SELECT_VIEW: &str = "SELECT s.id, s.title, s.description, s.price, s.student_id, \
     s.category_id, s.created_at, s.updated_at, \
     c.name AS category_name, c.description AS category_description, \
     st.university, st.major, st.graduation_year, st.user_id, \
     u.name AS user_name, u.email AS user_email \
     FROM services s \
     JOIN categories c ON c.id = s.category_id \
     JOIN students st ON st.id = s.student_id \
     JOIN users u ON u.id = st.user_id";

#[derive(Debug, FromRow)]
struct ServiceJoinRow {
    id: Uuid,
    title: String,
    description: String,
    price: f64,
    student_id: Uuid,
    category_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: String,
    category_description: String,
    university: String,
    major: String,
    graduation_year: i32,
    user_id: Uuid,
    user_name: String,
    user_email: String,
}

impl From<ServiceJoinRow> for ServiceView {
    fn from(r: ServiceJoinRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            price: r.price,
            student_id: r.student_id,
            category_id: r.category_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
            category: CategoryRow {
                id: r.category_id,
                name: r.category_name,
                description: r.category_description,
            },
            student: StudentWithUser {
                id: r.student_id,
                user_id: r.user_id,
                university: r.university,
                major: r.major,
                graduation_year: r.graduation_year,
                user: UserPublic {
                    name: r.user_name,
                    email: r.user_email,
                },
            },
        }
    }
}

impl Store {
    pub async fn create_service(&self, new: NewService<'_>) -> Result<Uuid, StoreError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO services (id, title, description, price, student_id, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(new.title)
        .bind(new.description)
        .bind(new.price)
        .bind(new.student_id)
        .bind(new.category_id)
        .fetch_one(self.pool())
        .await?;
        Ok(id)
    }

    pub async fn service_view(&self, id: Uuid) -> Result<Option<ServiceView>, StoreError> {
        let sql = format!("{SELECT_VIEW} WHERE s.id = $1");
        let row = sqlx::query_as::<_, ServiceJoinRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn list_services(
        &self,
        filter: ServiceFilter,
    ) -> Result<Vec<ServiceView>, StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(SELECT_VIEW);
        qb.push(" WHERE TRUE");

        if let Some(category) = filter.category {
            qb.push(" AND s.category_id = ").push_bind(category);
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            qb.push(" AND (s.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR s.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND s.price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND s.price <= ").push_bind(max);
        }
        qb.push(" ORDER BY s.created_at DESC");

        let rows: Vec<ServiceJoinRow> = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Ownership predicate: the service, if it belongs to `user_id`'s student
    /// profile.
    pub async fn find_service_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ServiceRow>, StoreError> {
        let row = sqlx::query_as::<_, ServiceRow>(
            "SELECT s.* FROM services s \
             JOIN students st ON st.id = s.student_id \
             WHERE s.id = $1 AND st.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn update_service(
        &self,
        id: Uuid,
        patch: ServicePatch<'_>,
    ) -> Result<(), StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("UPDATE services SET updated_at = now()");
        if let Some(title) = patch.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(description) = patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(price) = patch.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(category_id) = patch.category_id {
            qb.push(", category_id = ").push_bind(category_id);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(self.pool()).await?;
        Ok(())
    }

    pub async fn delete_service(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
