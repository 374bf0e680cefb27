use anyhow::Result;
use shared::Category;
use sqlx::Row;

use crate::storage::db::DbConnection;

/// Repository for the category tree shown on entry forms.
#[derive(Clone)]
pub struct CategoryRepository {
    db: DbConnection,
}

impl CategoryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, parent_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.parent_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// List the whole tree, roots and children alike, ordered by name.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, parent_id
            FROM categories
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: row.get("id"),
                name: row.get("name"),
                parent_id: row.get("parent_id"),
            })
            .collect())
    }

    pub async fn count_categories(&self) -> Result<u32> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n FROM categories
            "#,
        )
        .fetch_one(self.db.pool())
        .await?;
        Ok(row.get::<i64, _>("n") as u32)
    }
}
