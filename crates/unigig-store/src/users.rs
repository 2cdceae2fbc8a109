//! User and profile queries.

use crate::error::StoreError;
use crate::models::{ClientProfile, ClientRow, MeView, StudentProfile, StudentRow, UserRow};
use crate::Store;
use unigig_core::Role;
use uuid::Uuid;

/// Fields for a new user row.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: Role,
}

impl Store {
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    /// Insert a user. A duplicate email surfaces as [`StoreError::Conflict`].
    pub async fn create_user(&self, new: NewUser<'_>) -> Result<UserRow, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, password_hash, name, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.name)
        .bind(new.role.as_str())
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn update_user_name(&self, user_id: Uuid, name: &str) -> Result<UserRow, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET name = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn create_student(
        &self,
        user_id: Uuid,
        university: &str,
        major: &str,
        graduation_year: i32,
    ) -> Result<StudentRow, StoreError> {
        let row = sqlx::query_as::<_, StudentRow>(
            "INSERT INTO students (id, user_id, university, major, graduation_year) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(university)
        .bind(major)
        .bind(graduation_year)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn create_client(
        &self,
        user_id: Uuid,
        company: Option<&str>,
    ) -> Result<ClientRow, StoreError> {
        let row = sqlx::query_as::<_, ClientRow>(
            "INSERT INTO clients (id, user_id, company) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(company)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    /// Authorization predicate lookup: the student profile for a user, if any.
    pub async fn student_by_user(&self, user_id: Uuid) -> Result<Option<StudentRow>, StoreError> {
        let row = sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    /// Authorization predicate lookup: the client profile for a user, if any.
    pub async fn client_by_user(&self, user_id: Uuid) -> Result<Option<ClientRow>, StoreError> {
        let row = sqlx::query_as::<_, ClientRow>("SELECT * FROM clients WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    pub async fn update_student_profile(
        &self,
        user_id: Uuid,
        university: &str,
        major: &str,
        graduation_year: i32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE students SET university = $2, major = $3, graduation_year = $4 \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(university)
        .bind(major)
        .bind(graduation_year)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn update_client_profile(
        &self,
        user_id: Uuid,
        company: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE clients SET company = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(company)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// The caller's own profile with the role sub-profile inlined.
    pub async fn user_profile(&self, user_id: Uuid) -> Result<Option<MeView>, StoreError> {
        let Some(user) = self.find_user_by_id(user_id).await? else {
            return Ok(None);
        };

        let student = self.student_by_user(user_id).await?.map(|s| StudentProfile {
            university: s.university,
            major: s.major,
            graduation_year: s.graduation_year,
        });
        let client = self.client_by_user(user_id).await?.map(|c| ClientProfile {
            company: c.company,
        });

        Ok(Some(MeView {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            student,
            client,
        }))
    }
}
