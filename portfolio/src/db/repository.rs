//! Credential store trait and its PostgreSQL implementation.
//!
//! The trait keeps the auth and user managers independent of the database so
//! they can be exercised against [`MemoryCredentialStore`](super::MemoryCredentialStore).

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::StoreResult;
use super::timeouts::with_default_timeout;
use crate::auth::{Account, AccountId, NewAccount, Role};

/// Persistence operations for accounts
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find account by email (exact, case-sensitive)
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Find account by ID
    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Insert a new account. Fails with `StoreError::DuplicateEmail` if the email is taken.
    async fn insert(&self, account: NewAccount) -> StoreResult<Account>;

    /// Persist every mutable field of an existing account
    async fn save(&self, account: &Account) -> StoreResult<()>;

    /// Count accounts holding a role
    async fn count_by_role(&self, role: Role) -> StoreResult<i64>;

    /// Count all accounts
    async fn count(&self) -> StoreResult<i64>;

    /// List accounts newest first, optionally filtered by a substring of name or email
    async fn list(&self, search: Option<&str>) -> StoreResult<Vec<Account>>;

    /// Delete an account, returning whether it existed
    async fn delete(&self, id: AccountId) -> StoreResult<bool>;

    /// Check that the store is reachable
    async fn health_check(&self) -> StoreResult<()>;
}

const ACCOUNT_COLUMNS: &str = "id, email, hashed_password, name, bio, image, role, \
                               failed_login_attempts, locked_until, created_at";

/// PostgreSQL implementation of `CredentialStore`
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("hashed_password")?,
        name: row.try_get("name")?,
        bio: row.try_get("bio")?,
        image: row.try_get("image")?,
        role,
        failed_attempts: row.try_get("failed_login_attempts")?,
        locked_until: row.try_get("locked_until")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1");
        let row = with_default_timeout(
            sqlx::query(&sql).bind(email).fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        let row = with_default_timeout(sqlx::query(&sql).bind(id).fetch_optional(&self.pool))
            .await?;

        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        let sql = format!(
            "INSERT INTO users (email, hashed_password, name, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(&account.email)
                .bind(&account.password_hash)
                .bind(&account.name)
                .bind(account.role.as_str())
                .fetch_one(&self.pool),
        )
        .await?;

        Ok(account_from_row(&row)?)
    }

    async fn save(&self, account: &Account) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query(
                r#"
                UPDATE users
                SET email = $2, hashed_password = $3, name = $4, bio = $5, image = $6,
                    role = $7, failed_login_attempts = $8, locked_until = $9
                WHERE id = $1
                "#,
            )
            .bind(account.id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.name)
            .bind(&account.bio)
            .bind(&account.image)
            .bind(account.role.as_str())
            .bind(account.failed_attempts)
            .bind(account.locked_until)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<i64> {
        let row = with_default_timeout(
            sqlx::query("SELECT COUNT(*) AS count FROM users WHERE role = $1")
                .bind(role.as_str())
                .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.try_get("count")?)
    }

    async fn count(&self) -> StoreResult<i64> {
        let row = with_default_timeout(
            sqlx::query("SELECT COUNT(*) AS count FROM users").fetch_one(&self.pool),
        )
        .await?;

        Ok(row.try_get("count")?)
    }

    async fn list(&self, search: Option<&str>) -> StoreResult<Vec<Account>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users \
             WHERE $1::TEXT IS NULL \
                OR strpos(email, $1) > 0 \
                OR strpos(COALESCE(name, ''), $1) > 0 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = with_default_timeout(sqlx::query(&sql).bind(search).fetch_all(&self.pool))
            .await?;

        Ok(rows
            .iter()
            .map(account_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn delete(&self, id: AccountId) -> StoreResult<bool> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}
