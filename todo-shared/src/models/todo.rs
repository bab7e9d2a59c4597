/// Todo model and database operations
///
/// Every query is scoped to the owning account: an item that belongs to
/// someone else behaves exactly like one that doesn't exist.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todo (
///     id BIGSERIAL PRIMARY KEY,
///     account_id BIGINT NOT NULL REFERENCES account (id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     created_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     closed BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "kebab-case")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub closed: bool,
}

/// Input for creating a todo item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
}

const COLUMNS: &str = "id, title, description, created_on, updated_on, closed";

impl Todo {
    /// Lists an account's todos, oldest first
    pub async fn list_for(pool: &PgPool, owner: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {COLUMNS} FROM todo WHERE account_id = $1 ORDER BY id"
        ))
        .bind(owner)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &PgPool, owner: i64, data: NewTodo) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todo (account_id, title, description) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(owner)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find(pool: &PgPool, owner: i64, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {COLUMNS} FROM todo WHERE id = $1 AND account_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
    }

    /// Returns false when nothing was deleted
    pub async fn remove(pool: &PgPool, owner: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todo WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flips `closed` and bumps `updated_on`
    pub async fn toggle(pool: &PgPool, owner: i64, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            r#"
            UPDATE todo
            SET closed = NOT closed, updated_on = NOW()
            WHERE id = $1 AND account_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
    }
}
