/// Account endpoints
///
/// Both endpoints sit behind the access-token gate.
///
/// # Endpoints
///
/// - `GET /api/v1/account/user/:id` - Look up one account
/// - `GET /api/v1/account/users` - List all accounts

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use todo_shared::{auth::middleware::AuthUser, models::account::Account};

/// Look up an account by id
///
/// # Errors
///
/// - `404 Not Found`: No account with that id
pub async fn user_info(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Account>> {
    tracing::debug!(user_id = user.user_id, account_id = id, "Account lookup");

    state
        .store
        .find_account_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Account {} not found", id)))
}

/// List all accounts
pub async fn users_info(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(state.store.list_accounts().await?))
}
