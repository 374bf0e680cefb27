use anyhow::Result;
use shared::Account;
use sqlx::Row;

use crate::storage::db::DbConnection;

/// Repository for account identity rows. Credentials live with the upstream
/// authentication service; only the identity columns are stored here.
#[derive(Clone)]
pub struct AccountRepository {
    db: DbConnection,
}

impl AccountRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, email, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(account.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, created_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(account_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(Account {
                id: r.get("id"),
                username: r.get("username"),
                email: r.get("email"),
                created_at: r.get("created_at"),
            })),
            None => Ok(None),
        }
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM accounts WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.is_some())
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM accounts WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.is_some())
    }
}
