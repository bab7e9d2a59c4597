//! Common test utilities for HTTP tests
//!
//! This module provides shared infrastructure for the router tests:
//! - An in-memory [`Store`] so tests run without PostgreSQL
//! - A [`TestContext`] wrapping the real router
//! - Request and account helpers

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use todo_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use todo_shared::{
    auth::{jwt::TokenIssuer, password},
    models::{
        account::{Account, AccountCredential, NewAccount},
        todo::{NewTodo, Todo},
    },
    store::{AccountStore, Store, StoreError, TodoStore},
};
use tower::ServiceExt;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

// {"alg":"RS256","typ":"JWT"}
pub const RS256_HEADER: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";

/// Swaps the header segment of a signed token
pub fn with_header(token: &str, header: &str) -> String {
    let rest = token.split_once('.').map(|(_, rest)| rest).unwrap();
    format!("{}.{}", header, rest)
}

#[derive(Default)]
struct Tables {
    accounts: Vec<AccountCredential>,
    todos: Vec<(i64, Todo)>,
    next_account_id: i64,
    next_todo_id: i64,
}

/// Store keeping everything in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AccountCredential>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .map(AccountCredential::into_account))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.tables.lock().unwrap();

        if tables.accounts.iter().any(|a| a.username == account.username) {
            return Err(StoreError::Conflict("Username already taken".to_string()));
        }

        tables.next_account_id += 1;
        let credential = AccountCredential {
            id: tables.next_account_id,
            username: account.username,
            email: account.email,
            created_at: Utc::now(),
            password_hash: account.password_hash,
        };
        tables.accounts.push(credential.clone());

        Ok(credential.into_account())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .iter()
            .cloned()
            .map(AccountCredential::into_account)
            .collect())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_todos(&self, owner: i64) -> Result<Vec<Todo>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .todos
            .iter()
            .filter(|(o, _)| *o == owner)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn create_todo(&self, owner: i64, todo: NewTodo) -> Result<Todo, StoreError> {
        let mut tables = self.tables.lock().unwrap();

        tables.next_todo_id += 1;
        let now = Utc::now();
        let todo = Todo {
            id: tables.next_todo_id,
            title: todo.title,
            description: todo.description,
            created_on: now,
            updated_on: now,
            closed: false,
        };
        tables.todos.push((owner, todo.clone()));

        Ok(todo)
    }

    async fn find_todo(&self, owner: i64, id: i64) -> Result<Option<Todo>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .todos
            .iter()
            .find(|(o, t)| *o == owner && t.id == id)
            .map(|(_, t)| t.clone()))
    }

    async fn remove_todo(&self, owner: i64, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.todos.len();
        tables.todos.retain(|(o, t)| !(*o == owner && t.id == id));
        Ok(tables.todos.len() != before)
    }

    async fn toggle_todo(&self, owner: i64, id: i64) -> Result<Option<Todo>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .todos
            .iter_mut()
            .find(|(o, t)| *o == owner && t.id == id)
            .map(|(_, t)| {
                t.closed = !t.closed;
                t.updated_on = Utc::now();
                t.clone()
            }))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 10,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
        },
    }
}

/// Test context containing the router and its store
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: TokenIssuer,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let state = AppState::new(store.clone(), test_config());
        let tokens = state.tokens.clone();

        Self {
            app: build_router(state),
            store,
            tokens,
        }
    }

    /// Sends a request through the router
    ///
    /// JSON bodies are parsed; anything else comes back as a string value.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);

        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }

        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, value)
    }

    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, authorization, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    /// Inserts an account straight into the store
    pub async fn create_account(&self, username: &str, plaintext: &str) -> Account {
        self.store
            .create_account(NewAccount {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: password::hash_password(plaintext).unwrap(),
            })
            .await
            .unwrap()
    }

    /// Access token for an account, ready for the Authorization header
    pub fn bearer_for(&self, account: &Account) -> String {
        let token = self
            .tokens
            .issue_access(account.id, &account.username)
            .unwrap();
        format!("Bearer {}", token)
    }
}
