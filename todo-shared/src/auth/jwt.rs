/// JWT issuing and verification
///
/// Access and refresh tokens are HS256-signed JWTs carrying the account id.
/// Access tokens also carry the username. Both carry an explicit, signed
/// `token-type` claim.
///
/// # Token Types
///
/// - **Access Token**: 24 hours, proves identity on protected routes
/// - **Refresh Token**: 72 hours, only used to mint a new token pair
///
/// # Claims
///
/// ```json
/// {
///   "user-id": 42,
///   "user-name": "alice",
///   "token-type": "access",
///   "jti": "7f1c0c9e-...",
///   "iat": 1700000000,
///   "exp": 1700086400
/// }
/// ```
///
/// Verification only accepts the HMAC family (HS256/HS384/HS512). A token
/// whose header names any other algorithm is rejected before its signature
/// is looked at.
///
/// # Example
///
/// ```
/// use todo_shared::auth::jwt::TokenIssuer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("a-secret-key-at-least-32-bytes-long!!");
///
/// let access = issuer.issue_access(42, "alice")?;
/// let refresh = issuer.issue_refresh(42)?;
///
/// assert!(issuer.verify(&access)?);
/// assert!(issuer.is_access_token(&access)?);
/// assert!(!issuer.is_access_token(&refresh)?);
/// assert_eq!(issuer.user_id_from(&refresh)?, 42);
/// # Ok(())
/// # }
/// ```

use std::{fmt, sync::Arc};

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::Identity;

/// Claim name holding the account id
pub const USER_ID_CLAIM: &str = "user-id";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token could not be decoded
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Token header names a non-HMAC algorithm
    #[error("Unexpected signing method")]
    UnexpectedAlgorithm,

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature does not match the configured secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Required claim is absent or has the wrong type
    #[error("Token does not contain `{0}` claim")]
    MissingClaim(&'static str),
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived, 24 hours)
    Access,

    /// Refresh token (long-lived, 72 hours)
    Refresh,
}

impl TokenType {
    /// Gets default lifetime for token type
    pub fn default_lifetime(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::hours(72),
        }
    }
}

/// JWT claims structure
///
/// `token_type` is optional on the way in so that tokens minted before the
/// claim existed still decode. Such tokens are classified by whether they
/// carry a username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Claims {
    /// Account id
    pub user_id: i64,

    /// Username (access tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Access or refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,

    /// Unique token id, so two tokens minted in the same second differ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Access claims expiring `expires_in` from now
    pub fn access(user_id: i64, username: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            user_name: Some(username.into()),
            token_type: Some(TokenType::Access),
            jti: Some(Uuid::new_v4().to_string()),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Refresh claims expiring `expires_in` from now
    pub fn refresh(user_id: i64, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            user_name: None,
            token_type: Some(TokenType::Refresh),
            jti: Some(Uuid::new_v4().to_string()),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    fn has_username(&self) -> bool {
        self.user_name.as_deref().is_some_and(|name| !name.is_empty())
    }

    /// Whether these claims describe an access token
    pub fn is_access(&self) -> bool {
        match self.token_type {
            Some(TokenType::Access) => self.has_username(),
            Some(TokenType::Refresh) => false,
            None => self.has_username(),
        }
    }
}

/// Access + refresh token pair as exchanged with clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn validation(check_expiry: bool) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.leeway = 0;
    validation.validate_exp = check_expiry;
    validation
}

fn decode_claims<T: DeserializeOwned>(
    token: &str,
    secret: &str,
    check_expiry: bool,
) -> Result<T, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    decode::<T>(token, &key, &validation(check_expiry))
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => JwtError::UnexpectedAlgorithm,
            _ => JwtError::Malformed(e.to_string()),
        })
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if the secret is empty or encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::CreateError("signing secret is empty".to_string()));
    }

    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Checks signature and expiry
///
/// # Returns
///
/// `Ok(true)` for a valid token, `Ok(false)` for a well-formed token that has
/// expired or was signed with another secret.
///
/// # Errors
///
/// `JwtError::UnexpectedAlgorithm` for non-HMAC headers and
/// `JwtError::Malformed` for anything that can't be decoded.
pub fn verify_token(token: &str, secret: &str) -> Result<bool, JwtError> {
    match decode_claims::<serde_json::Value>(token, secret, true) {
        Ok(_) => Ok(true),
        Err(JwtError::Expired | JwtError::InvalidSignature) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reports whether a token is an access token
///
/// The signature is checked, expiry is not.
pub fn is_access_token(token: &str, secret: &str) -> Result<bool, JwtError> {
    decode_claims::<Claims>(token, secret, false).map(|claims| claims.is_access())
}

/// Extracts the `user-id` claim
///
/// The signature is checked, expiry is not.
pub fn user_id_from(token: &str, secret: &str) -> Result<i64, JwtError> {
    let claims: serde_json::Map<String, serde_json::Value> = decode_claims(token, secret, false)?;

    claims
        .get(USER_ID_CLAIM)
        .and_then(serde_json::Value::as_i64)
        .ok_or(JwtError::MissingClaim(USER_ID_CLAIM))
}

/// Issues and verifies tokens with the server's Credential Secret
///
/// Built once at startup from configuration and shared read-only across
/// requests. Cloning is cheap.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Arc<str>,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[redacted]")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates an issuer with the default 24h / 72h lifetimes
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
            access_lifetime: TokenType::Access.default_lifetime(),
            refresh_lifetime: TokenType::Refresh.default_lifetime(),
        }
    }

    /// Overrides token lifetimes
    ///
    /// Negative durations produce tokens that are already expired.
    pub fn with_lifetimes(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_lifetime = access;
        self.refresh_lifetime = refresh;
        self
    }

    pub fn issue_access(&self, user_id: i64, username: &str) -> Result<String, JwtError> {
        create_token(
            &Claims::access(user_id, username, self.access_lifetime),
            &self.secret,
        )
    }

    pub fn issue_refresh(&self, user_id: i64) -> Result<String, JwtError> {
        create_token(&Claims::refresh(user_id, self.refresh_lifetime), &self.secret)
    }

    /// Issues a fresh access + refresh pair for an identity
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue_access(identity.user_id, &identity.username)?,
            refresh_token: self.issue_refresh(identity.user_id)?,
        })
    }

    pub fn verify(&self, token: &str) -> Result<bool, JwtError> {
        verify_token(token, &self.secret)
    }

    pub fn is_access_token(&self, token: &str) -> Result<bool, JwtError> {
        is_access_token(token, &self.secret)
    }

    pub fn user_id_from(&self, token: &str) -> Result<i64, JwtError> {
        user_id_from(token, &self.secret)
    }
}
