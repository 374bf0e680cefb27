use anyhow::Result;
use shared::Child;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::storage::db::DbConnection;

/// Repository for child profile rows.
#[derive(Clone)]
pub struct ChildRepository {
    db: DbConnection,
}

impl ChildRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_child(&self, child: &Child) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO children (id, parent_id, name, birth_date, school, year,
                                  class_name, colour, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&child.id)
        .bind(&child.parent_id)
        .bind(&child.name)
        .bind(child.birth_date)
        .bind(&child.school)
        .bind(&child.year)
        .bind(&child.class_name)
        .bind(&child.colour)
        .bind(child.created_at)
        .bind(child.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_child(&self, child_id: &str) -> Result<Option<Child>> {
        let row = sqlx::query(
            r#"
            SELECT id, parent_id, name, birth_date, school, year,
                   class_name, colour, created_at, updated_at
            FROM children
            WHERE id = ?
            "#,
        )
        .bind(child_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(map_child))
    }

    /// List a parent's children ordered by name.
    pub async fn list_for_parent(&self, parent_id: &str) -> Result<Vec<Child>> {
        let rows = sqlx::query(
            r#"
            SELECT id, parent_id, name, birth_date, school, year,
                   class_name, colour, created_at, updated_at
            FROM children
            WHERE parent_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(map_child).collect())
    }

    pub async fn count_for_parent(&self, parent_id: &str) -> Result<u32> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n FROM children WHERE parent_id = ?
            "#,
        )
        .bind(parent_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row.get::<i64, _>("n") as u32)
    }

    pub async fn update_child(&self, child: &Child) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE children
            SET name = ?, birth_date = ?, school = ?, year = ?,
                class_name = ?, colour = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&child.name)
        .bind(child.birth_date)
        .bind(&child.school)
        .bind(&child.year)
        .bind(&child.class_name)
        .bind(&child.colour)
        .bind(child.updated_at)
        .bind(&child.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a child. Its entries go with it via the foreign key cascade.
    pub async fn delete_child(&self, child_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM children WHERE id = ?
            "#,
        )
        .bind(child_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

fn map_child(row: SqliteRow) -> Child {
    Child {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        name: row.get("name"),
        birth_date: row.get("birth_date"),
        school: row.get("school"),
        year: row.get("year"),
        class_name: row.get("class_name"),
        colour: row.get("colour"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
