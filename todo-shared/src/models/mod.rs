/// Database models
///
/// # Models
///
/// - `account`: Registered accounts and their stored credentials
/// - `todo`: Personal todo items, owned by an account
///
/// # Example
///
/// ```no_run
/// use todo_shared::models::account::{Account, NewAccount};
/// use todo_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let account = Account::create(
///     &pool,
///     NewAccount {
///         username: "alice".to_string(),
///         email: "a@x.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod todo;
