use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use shared::{Entry, EntryType, Priority};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::storage::db::DbConnection;

/// Repository for entry rows (notes, tasks and events).
#[derive(Clone)]
pub struct EntryRepository {
    db: DbConnection,
}

impl EntryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_entry(&self, entry: &Entry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO entries (id, child_id, title, entry_type, category, description,
                                 priority, due_date, is_completed, start_time, end_time,
                                 event_date, event_start_time, event_end_time,
                                 task_due_date, task_due_time, location, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.child_id)
        .bind(&entry.title)
        .bind(entry.entry_type.as_str())
        .bind(&entry.category)
        .bind(&entry.description)
        .bind(entry.priority.as_str())
        .bind(entry.due_date)
        .bind(entry.is_completed)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(entry.event_date)
        .bind(entry.event_start_time)
        .bind(entry.event_end_time)
        .bind(entry.task_due_date)
        .bind(entry.task_due_time)
        .bind(&entry.location)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_entry(&self, entry_id: &str) -> Result<Option<Entry>> {
        let row = sqlx::query(
            r#"
            SELECT id, child_id, title, entry_type, category, description,
                   priority, due_date, is_completed, start_time, end_time,
                   event_date, event_start_time, event_end_time,
                   task_due_date, task_due_time, location, created_at, updated_at
            FROM entries
            WHERE id = ?
            "#,
        )
        .bind(entry_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(map_entry).transpose()
    }

    /// All entries of one child, oldest first.
    pub async fn list_for_child(&self, child_id: &str) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, child_id, title, entry_type, category, description,
                   priority, due_date, is_completed, start_time, end_time,
                   event_date, event_start_time, event_end_time,
                   task_due_date, task_due_time, location, created_at, updated_at
            FROM entries
            WHERE child_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(child_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(map_entry).collect()
    }

    /// All entries across a parent's children, oldest first.
    pub async fn list_for_parent(&self, parent_id: &str) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.child_id, e.title, e.entry_type, e.category, e.description,
                   e.priority, e.due_date, e.is_completed, e.start_time, e.end_time,
                   e.event_date, e.event_start_time, e.event_end_time,
                   e.task_due_date, e.task_due_time, e.location, e.created_at, e.updated_at
            FROM entries e
            JOIN children c ON c.id = e.child_id
            WHERE c.parent_id = ?
            ORDER BY e.created_at ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(map_entry).collect()
    }

    pub async fn update_entry(&self, entry: &Entry) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE entries
            SET title = ?, child_id = ?, entry_type = ?, category = ?, description = ?,
                priority = ?, due_date = ?, is_completed = ?, start_time = ?, end_time = ?,
                event_date = ?, event_start_time = ?, event_end_time = ?,
                task_due_date = ?, task_due_time = ?, location = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&entry.title)
        .bind(&entry.child_id)
        .bind(entry.entry_type.as_str())
        .bind(&entry.category)
        .bind(&entry.description)
        .bind(entry.priority.as_str())
        .bind(entry.due_date)
        .bind(entry.is_completed)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(entry.event_date)
        .bind(entry.event_start_time)
        .bind(entry.event_end_time)
        .bind(entry.task_due_date)
        .bind(entry.task_due_time)
        .bind(&entry.location)
        .bind(entry.updated_at)
        .bind(&entry.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM entries WHERE id = ?
            "#,
        )
        .bind(entry_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist a new completion flag, bumping the modification timestamp.
    pub async fn set_completion(
        &self,
        entry_id: &str,
        is_completed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE entries SET is_completed = ?, updated_at = ? WHERE id = ?
            "#,
        )
        .bind(is_completed)
        .bind(updated_at)
        .bind(entry_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

fn map_entry(row: SqliteRow) -> Result<Entry> {
    let entry_type: String = row.get("entry_type");
    let entry_type = EntryType::parse(&entry_type)
        .ok_or_else(|| anyhow!("Unknown entry type in storage: {}", entry_type))?;

    let priority: String = row.get("priority");
    let priority = Priority::parse(&priority)
        .ok_or_else(|| anyhow!("Unknown priority in storage: {}", priority))?;

    Ok(Entry {
        id: row.get("id"),
        child_id: row.get("child_id"),
        title: row.get("title"),
        entry_type,
        category: row.get("category"),
        description: row.get("description"),
        priority,
        due_date: row.get("due_date"),
        is_completed: row.get("is_completed"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        event_date: row.get("event_date"),
        event_start_time: row.get("event_start_time"),
        event_end_time: row.get("event_end_time"),
        task_due_date: row.get("task_due_date"),
        task_due_time: row.get("task_due_time"),
        location: row.get("location"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
