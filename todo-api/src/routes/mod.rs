/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `authentication`: Sign-up, sign-in and token refresh
/// - `account`: Account lookup (access token required)
/// - `todo`: The caller's todo items (access token required)

pub mod account;
pub mod authentication;
pub mod health;
pub mod todo;
