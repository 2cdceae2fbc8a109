//! Activity-log queries.

use crate::error::StoreError;
use crate::models::ActivityLogRow;
use crate::Store;
use uuid::Uuid;

impl Store {
    pub async fn log_activity(
        &self,
        action: &str,
        user_id: Uuid,
        gig_id: Uuid,
    ) -> Result<ActivityLogRow, StoreError> {
        let row = sqlx::query_as::<_, ActivityLogRow>(
            "INSERT INTO activity_logs (id, action, user_id, gig_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(action)
        .bind(user_id)
        .bind(gig_id)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    /// Ownership predicate: the activity log, if it was recorded for
    /// `user_id`.
    pub async fn find_activity_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ActivityLogRow>, StoreError> {
        let row = sqlx::query_as::<_, ActivityLogRow>(
            "SELECT * FROM activity_logs WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// Compensation for the apply flow: drop a log entry whose follow-up
    /// writes failed.
    pub async fn delete_activity_log(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM activity_logs WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
