/// Account model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE account (
///     id BIGSERIAL PRIMARY KEY,
///     username TEXT NOT NULL UNIQUE,
///     email TEXT NOT NULL,
///     hash_password TEXT NOT NULL,
///     created_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The password hash is written once at registration and only read back for
/// sign-in. [`Account`] never carries it, so it can't leak into a response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Identity a request acts as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Account as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "kebab-case")]
pub struct Account {
    /// Account id
    pub id: i64,

    /// Unique login name
    #[serde(rename = "user-name")]
    pub username: String,

    pub email: String,

    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Identity embedded into issued tokens
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Account together with its stored password hash
///
/// Only used on the sign-in path.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountCredential {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,

    /// Argon2id PHC string
    pub password_hash: String,
}

impl AccountCredential {
    /// Drops the password hash
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

impl Account {
    /// Inserts a new account
    ///
    /// # Errors
    ///
    /// Returns an error if the username is taken (unique constraint
    /// `account_username_key`) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: NewAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO account (username, hash_password, email)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, created_on AS created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.email)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, created_on AS created_at
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account and its password hash by username
    pub async fn find_credential_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<AccountCredential>, sqlx::Error> {
        let credential = sqlx::query_as::<_, AccountCredential>(
            r#"
            SELECT id, username, email, created_on AS created_at, hash_password AS password_hash
            FROM account
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(credential)
    }

    /// Lists all accounts, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, created_on AS created_at
            FROM account
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }
}
