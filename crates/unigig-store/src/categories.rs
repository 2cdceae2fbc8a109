//! Category lookup.

use crate::error::StoreError;
use crate::models::CategoryRow;
use crate::Store;

impl Store {
    pub async fn list_categories(&self) -> Result<Vec<CategoryRow>, StoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }
}
