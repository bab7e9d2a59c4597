/// Access-token gate for protected routes
///
/// Every request to a protected route group passes through
/// [`require_access_token`], which either rejects it with `401 Unauthorized`
/// or inserts an [`AuthUser`] into the request extensions and forwards it.
///
/// # Checks, in order
///
/// 1. The `Authorization` header is present (an optional `Bearer ` prefix is
///    dropped, otherwise the value is used verbatim)
/// 2. Signature and expiry are valid
/// 3. The token is an access token, not a refresh token
/// 4. The `user-id` claim can be read
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use todo_shared::auth::jwt::TokenIssuer;
/// use todo_shared::auth::middleware::{require_access_token, AuthUser};
///
/// async fn whoami(user: AuthUser) -> String {
///     format!("user {}", user.user_id)
/// }
///
/// let tokens = TokenIssuer::new("a-secret-key-at-least-32-bytes-long!!");
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn_with_state(tokens, require_access_token));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::jwt::TokenIssuer;

/// Authenticated caller, resolved by the middleware
///
/// Handlers take it as an extractor. Extraction fails with 401 when the
/// route is not behind [`require_access_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Signature, expiry or format check failed
    #[error("token isn't valid")]
    InvalidToken,

    /// A refresh token was presented as a bearer token
    #[error("access token required")]
    NotAccessToken,

    /// Identity could not be read from the token
    #[error("access denied")]
    AccessDenied,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

/// Resolves the caller from request headers
pub fn authenticate(tokens: &TokenIssuer, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingCredentials)?;

    match tokens.verify(token) {
        Ok(true) => {}
        Ok(false) => return Err(AuthError::InvalidToken),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected undecodable bearer token");
            return Err(AuthError::InvalidToken);
        }
    }

    match tokens.is_access_token(token) {
        Ok(true) => {}
        Ok(false) => return Err(AuthError::NotAccessToken),
        Err(e) => {
            tracing::debug!(error = %e, "Could not classify bearer token");
            return Err(AuthError::NotAccessToken);
        }
    }

    let user_id = tokens.user_id_from(token).map_err(|e| {
        tracing::debug!(error = %e, "Could not read user id from bearer token");
        AuthError::AccessDenied
    })?;

    Ok(AuthUser { user_id })
}

/// Middleware function for `axum::middleware::from_fn_with_state`
pub async fn require_access_token(
    State(tokens): State<TokenIssuer>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(&tokens, req.headers()).map_err(|e| {
        tracing::warn!(
            method = %req.method(),
            uri = %req.uri(),
            reason = %e,
            "Unauthorized request"
        );
        e
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}
