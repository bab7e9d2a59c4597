/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Access/refresh token issuing and verification
/// - [`middleware`]: Axum middleware gating protected routes
///
/// # Example
///
/// ```no_run
/// use todo_shared::auth::password::{hash_password, verify_password};
/// use todo_shared::auth::jwt::TokenIssuer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenIssuer::new("a-secret-key-at-least-32-bytes-long!!");
/// let access = tokens.issue_access(1, "alice")?;
/// assert!(tokens.verify(&access)?);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
