use anyhow::Result;
use shared::Parent;
use sqlx::Row;

use crate::storage::db::DbConnection;

/// Repository for parent rows, the ownership root for children and entries.
#[derive(Clone)]
pub struct ParentRepository {
    db: DbConnection,
}

impl ParentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_parent(&self, parent: &Parent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO parents (id, account_id)
            VALUES (?, ?)
            "#,
        )
        .bind(&parent.id)
        .bind(&parent.account_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn find_by_account(&self, account_id: &str) -> Result<Option<Parent>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id
            FROM parents
            WHERE account_id = ?
            "#,
        )
        .bind(account_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(Parent {
                id: r.get("id"),
                account_id: r.get("account_id"),
            })),
            None => Ok(None),
        }
    }
}
