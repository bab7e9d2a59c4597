/// Persistence seam
///
/// Handlers and the refresh flow talk to storage only through these traits.
/// [`PgStore`] is the production implementation on top of the sqlx models;
/// tests plug in an in-memory implementation.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todo_shared::store::{AccountStore, PgStore, Store};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
///
/// if let Some(account) = store.find_account_by_id(1).await? {
///     println!("{}", account.username);
/// }
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::pool;
use crate::models::{
    account::{Account, AccountCredential, NewAccount},
    todo::{NewTodo, Todo},
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated (e.g. username taken)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("username") {
                    return StoreError::Conflict("Username already taken".to_string());
                }
                return StoreError::Conflict(format!("Constraint violation: {}", constraint));
            }
        }

        StoreError::Database(err)
    }
}

/// Account persistence
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Account plus password hash, for sign-in
    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AccountCredential>, StoreError>;

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the username is taken
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
}

/// Todo persistence, always scoped to the owning account
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list_todos(&self, owner: i64) -> Result<Vec<Todo>, StoreError>;

    async fn create_todo(&self, owner: i64, todo: NewTodo) -> Result<Todo, StoreError>;

    async fn find_todo(&self, owner: i64, id: i64) -> Result<Option<Todo>, StoreError>;

    /// Returns false when the item doesn't exist or isn't owned by `owner`
    async fn remove_todo(&self, owner: i64, id: i64) -> Result<bool, StoreError>;

    /// Flips `closed`; `None` when the item doesn't exist or isn't owned by `owner`
    async fn toggle_todo(&self, owner: i64, id: i64) -> Result<Option<Todo>, StoreError>;
}

/// Everything the API needs from storage
#[async_trait]
pub trait Store: AccountStore + TodoStore {
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AccountCredential>, StoreError> {
        Ok(Account::find_credential_by_username(&self.pool, username).await?)
    }

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(Account::find_by_id(&self.pool, id).await?)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        Ok(Account::create(&self.pool, account).await?)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(Account::list(&self.pool).await?)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list_todos(&self, owner: i64) -> Result<Vec<Todo>, StoreError> {
        Ok(Todo::list_for(&self.pool, owner).await?)
    }

    async fn create_todo(&self, owner: i64, todo: NewTodo) -> Result<Todo, StoreError> {
        Ok(Todo::create(&self.pool, owner, todo).await?)
    }

    async fn find_todo(&self, owner: i64, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(Todo::find(&self.pool, owner, id).await?)
    }

    async fn remove_todo(&self, owner: i64, id: i64) -> Result<bool, StoreError> {
        Ok(Todo::remove(&self.pool, owner, id).await?)
    }

    async fn toggle_todo(&self, owner: i64, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(Todo::toggle(&self.pool, owner, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(pool::health_check(&self.pool).await?)
    }
}
