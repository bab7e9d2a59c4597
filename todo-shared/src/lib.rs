//! # Todo Shared Library
//!
//! Types and logic shared by the todo API server: account and todo models,
//! the persistence layer, and the authentication core.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, token issuing/verification, auth middleware
//! - `db`: Connection pool and migrations
//! - `models`: Database models and data structures
//! - `store`: Persistence traits and the PostgreSQL implementation

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the todo shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
