/// Todo endpoints
///
/// Every endpoint acts on the caller's own items. An item that belongs to
/// another account is reported as not found.
///
/// # Endpoints
///
/// - `GET /api/v1/todo/ping` - Echo the caller's id
/// - `GET /api/v1/todo/my/todos` - List the caller's items
/// - `POST /api/v1/todo/add` - Create an item
/// - `DELETE /api/v1/todo/remove/:id` - Delete an item
/// - `GET /api/v1/todo/:id` - Fetch an item
/// - `PUT /api/v1/todo/toggle/:id` - Flip an item's `closed` flag

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use todo_shared::{
    auth::middleware::AuthUser,
    models::todo::{NewTodo, Todo},
};
use tracing::info;
use validator::Validate;

/// Create-item request
#[derive(Debug, Deserialize, Validate)]
pub struct TodoForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

/// Ping response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PingResponse {
    pub user_id: i64,
    pub message: String,
    pub code: u16,
}

/// Generic status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub code: u16,
    pub message: String,
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Todo {} not found", id))
}

/// Confirms the token works and shows whose it is
///
/// # Response
///
/// ```json
/// { "user-id": 1, "message": "Success made request", "code": 200 }
/// ```
pub async fn ping(user: AuthUser) -> Json<PingResponse> {
    Json(PingResponse {
        user_id: user.user_id,
        message: "Success made request".to_string(),
        code: 200,
    })
}

pub async fn my_todos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.store.list_todos(user.user_id).await?))
}

/// Create an item owned by the caller
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty or overlong title
pub async fn add_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<TodoForm>,
) -> ApiResult<Json<Todo>> {
    form.validate()?;

    let todo = state
        .store
        .create_todo(
            user.user_id,
            NewTodo {
                title: form.title,
                description: form.description,
            },
        )
        .await?;

    info!(user_id = user.user_id, todo_id = todo.id, "Todo created");

    Ok(Json(todo))
}

/// Delete one of the caller's items
///
/// # Response
///
/// ```json
/// { "code": 200, "message": "Removed todo 3" }
/// ```
pub async fn remove_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<StatusResponse>> {
    if !state.store.remove_todo(user.user_id, id).await? {
        return Err(not_found(id));
    }

    info!(user_id = user.user_id, todo_id = id, "Todo removed");

    Ok(Json(StatusResponse {
        code: 200,
        message: format!("Removed todo {}", id),
    }))
}

pub async fn get_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Todo>> {
    state
        .store
        .find_todo(user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Todo>> {
    state
        .store
        .toggle_todo(user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_form_description_defaults_to_empty() {
        let form: TodoForm = serde_json::from_str(r#"{"title":"milk"}"#).unwrap();

        assert_eq!(form.description, "");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_todo_form_rejects_empty_title() {
        let form = TodoForm {
            title: String::new(),
            description: String::new(),
        };

        assert!(form.validate().is_err());
    }

    #[test]
    fn test_ping_wire_format() {
        let json = serde_json::to_value(PingResponse {
            user_id: 7,
            message: "Success made request".to_string(),
            code: 200,
        })
        .unwrap();

        assert_eq!(json["user-id"], 7);
        assert_eq!(json["code"], 200);
    }
}
