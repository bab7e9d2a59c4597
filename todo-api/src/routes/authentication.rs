/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/authentication/sign-up` - Register a new account
/// - `POST /api/v1/authentication/sign-in` - Exchange credentials for a token pair
/// - `POST /api/v1/authentication/refresh-token` - Renew a token pair
///
/// # Refresh
///
/// The client sends back the pair it holds:
///
/// 1. Access token still valid: the pair is returned unchanged
/// 2. Otherwise the refresh token must be valid, unexpired, and not an
///    access token
/// 3. The account it names must still exist
/// 4. A brand new pair is issued for that account

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::Deserialize;
use todo_shared::{
    auth::{
        jwt::{JwtError, TokenPair},
        password::{self, PasswordError},
    },
    models::account::{Account, NewAccount},
};
use tracing::{debug, info, warn};
use validator::Validate;

/// Sign-up request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "kebab-case")]
pub struct RegistrationForm {
    /// Unique login name
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub user_name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "kebab-case")]
pub struct CredentialsForm {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub user_name: String,

    pub password: String,
}

/// Runs a hasher call on the blocking thread pool
async fn run_hasher<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("Password task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/authentication/sign-up
/// Content-Type: application/json
///
/// {
///   "user-name": "alice",
///   "email": "a@x.com",
///   "password": "s3cret!"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": 1,
///   "user-name": "alice",
///   "email": "a@x.com",
///   "created-at": "2024-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn sign_up(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> ApiResult<Json<Account>> {
    form.validate()?;

    let RegistrationForm {
        user_name,
        email,
        password: plaintext,
    } = form;

    let password_hash = run_hasher(move || password::hash_password(&plaintext)).await?;

    let account = state
        .store
        .create_account(NewAccount {
            username: user_name,
            email,
            password_hash,
        })
        .await?;

    info!(user_id = account.id, "Account created");

    Ok(Json(account))
}

/// Sign in with username and password
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/authentication/sign-in
/// Content-Type: application/json
///
/// {
///   "user-name": "alice",
///   "password": "s3cret!"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access-token": "eyJ...",
///   "refresh-token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
pub async fn sign_in(
    State(state): State<AppState>,
    Json(form): Json<CredentialsForm>,
) -> ApiResult<Json<TokenPair>> {
    form.validate()?;

    let credential = state
        .store
        .find_account_by_username(&form.user_name)
        .await?
        .ok_or_else(|| {
            debug!("Sign-in for unknown username");
            ApiError::Unauthorized("Invalid username or password".to_string())
        })?;

    let candidate = form.password;
    let hash = credential.password_hash.clone();
    let matches = run_hasher(move || password::verify_password(&candidate, &hash)).await?;

    if !matches {
        warn!(user_id = credential.id, "Sign-in with wrong password");
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let account = credential.into_account();
    let pair = state.tokens.issue_pair(&account.identity())?;

    info!(user_id = account.id, "Signed in");

    Ok(Json(pair))
}

/// Renew a token pair
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/authentication/refresh-token
/// Content-Type: application/json
///
/// {
///   "access-token": "eyJ...",
///   "refresh-token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Refresh token cannot be decoded
/// - `401 Unauthorized`: Refresh token invalid or expired, an access token
///   was sent as the refresh token, or the account no longer exists
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(pair): Json<TokenPair>,
) -> ApiResult<Json<TokenPair>> {
    if let Ok(true) = state.tokens.verify(&pair.access_token) {
        debug!("Access token still valid, returning the pair unchanged");
        return Ok(Json(pair));
    }

    match state.tokens.verify(&pair.refresh_token) {
        Ok(true) => {}
        Ok(false) => {
            return Err(ApiError::Unauthorized(
                "Refresh token is invalid or expired".to_string(),
            ))
        }
        Err(JwtError::Malformed(msg)) => {
            return Err(ApiError::BadRequest(format!(
                "Malformed refresh token: {}",
                msg
            )))
        }
        Err(e) => return Err(e.into()),
    }

    if state.tokens.is_access_token(&pair.refresh_token)? {
        warn!("Access token presented as refresh token");
        return Err(ApiError::Unauthorized(
            "Expected a refresh token".to_string(),
        ));
    }

    let user_id = state.tokens.user_id_from(&pair.refresh_token)?;

    let account = state
        .store
        .find_account_by_id(user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id, "Refresh for an account that no longer exists");
            ApiError::Unauthorized("Account no longer exists".to_string())
        })?;

    let renewed = state.tokens.issue_pair(&account.identity())?;

    info!(user_id, "Issued a new token pair");

    Ok(Json(renewed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_form_validation() {
        let form = RegistrationForm {
            user_name: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "s3cret!".to_string(),
        };
        assert!(form.validate().is_ok());

        let form = RegistrationForm {
            user_name: String::new(),
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_registration_form_wire_names() {
        let form: RegistrationForm = serde_json::from_str(
            r#"{"user-name":"alice","email":"a@x.com","password":"s3cret!"}"#,
        )
        .unwrap();

        assert_eq!(form.user_name, "alice");
    }

    #[test]
    fn test_username_length_limit() {
        let form = RegistrationForm {
            user_name: "a".repeat(65),
            email: "a@x.com".to_string(),
            password: "s3cret!".to_string(),
        };

        assert!(form.validate().is_err());
    }
}
