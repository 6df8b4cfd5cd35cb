//! services/api/src/adapters/db.rs
//!
//! The Postgres adapter: the concrete implementation of the
//! `CredentialStore` port backed by `sqlx`. Each account lives whole in one
//! JSONB document addressed by id, with the email extracted into its own
//! uniquely-indexed column. `conditional_update` takes the row lock for the
//! duration of one transaction, which serializes concurrent writers of the
//! same document and nothing else.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};

use newswatcher_core::domain::{NewAccount, UserAccount, UserId};
use newswatcher_core::ports::{CredentialStore, Mutation, Predicate, StoreError, StoreResult};

/// A credential store backed by a Postgres JSONB column.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the accounts table and unique email index at startup.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                 id UUID PRIMARY KEY,
                 email TEXT NOT NULL,
                 doc JSONB NOT NULL
             )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_lower_idx
                 ON accounts (LOWER(email))",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn decode(doc: serde_json::Value) -> StoreResult<UserAccount> {
    serde_json::from_value(doc)
        .map_err(|e| StoreError::Unexpected(format!("undecodable account document: {}", e)))
}

fn encode(account: &UserAccount) -> StoreResult<serde_json::Value> {
    serde_json::to_value(account)
        .map_err(|e| StoreError::Unexpected(format!("unencodable account document: {}", e)))
}

fn map_sqlx(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        // Unique-index violation on the email column.
        if db.code().as_deref() == Some("23505") {
            return StoreError::DuplicateKey;
        }
    }
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Unexpected(other.to_string()),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let row = sqlx::query("SELECT doc FROM accounts WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(|r| decode(r.get("doc"))).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        let row = sqlx::query("SELECT doc FROM accounts WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(|r| decode(r.get("doc"))).transpose()
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<UserAccount> {
        let created = account.into_account(UserId::new(), Utc::now());
        sqlx::query("INSERT INTO accounts (id, email, doc) VALUES ($1, $2, $3)")
            .bind(created.id.0)
            .bind(&created.email)
            .bind(encode(&created)?)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(created)
    }

    async fn conditional_update(
        &self,
        id: UserId,
        predicate: &Predicate,
        mutation: &Mutation,
    ) -> StoreResult<Option<UserAccount>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // FOR UPDATE holds the row lock until commit, making the
        // read-modify-write below atomic with respect to other writers.
        let row = sqlx::query("SELECT doc FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut account = decode(row.get("doc"))?;
        if !predicate(&account) {
            // Dropping the transaction rolls it back and releases the lock.
            return Ok(None);
        }

        let before = account.clone();
        mutation(&mut account);
        sqlx::query("UPDATE accounts SET doc = $2 WHERE id = $1")
            .bind(id.0)
            .bind(encode(&account)?)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        tx.commit().await.map_err(map_sqlx)?;
        Ok(Some(before))
    }

    async fn delete_by_id(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}
