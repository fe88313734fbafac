// ABOUTME: Session tokens and sign-in completion for externally authenticated users
// ABOUTME: Issues and validates HS256 JWTs and resolves the caller from a request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication and Session Management
//!
//! The external identity provider hands us an open id; everything after that
//! is local. [`AuthService::complete_login`] upserts the user (forcing the
//! configured owner to `admin`) and issues a session token, and
//! [`AuthService::resolve_caller`] turns a bearer header or the `auth_token`
//! cookie back into a [`User`]. A missing, expired or forged token simply
//! means there is no caller.

use crate::config::AuthConfig;
use crate::constants::session::COOKIE_NAME;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{UpsertUser, User, UserRole};
use crate::security::cookies::get_cookie_value;
use chrono::{DateTime, Duration, TimeZone, Utc};
use http::header::AUTHORIZATION;
use http::HeaderMap;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, Error)]
pub enum JwtValidationError {
    /// Token has expired
    #[error("JWT token expired at {}", .expired_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature or claims are invalid
    #[error("JWT token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is not a well-formed `JWT`
    #[error("JWT token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

/// `JWT` claims for a user session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Internal user id
    pub sub: String,
    /// External identity the session was issued for
    pub open_id: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Token id
    pub jti: String,
}

impl Claims {
    /// Internal user id carried by the token
    ///
    /// # Errors
    ///
    /// Returns an error if `sub` is not numeric
    pub fn user_id(&self) -> Result<i64, JwtValidationError> {
        self.sub
            .parse()
            .map_err(|_| JwtValidationError::TokenInvalid {
                reason: "subject is not a user id".to_owned(),
            })
    }
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a session manager for an HMAC secret
    #[must_use]
    pub fn new(secret: &[u8], expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_hours,
        }
    }

    /// Token lifetime in seconds, used for the cookie `Max-Age`
    #[must_use]
    pub const fn expiry_seconds(&self) -> i64 {
        self.expiry_hours.saturating_mul(3600)
    }

    /// Issue a session token for `user`
    ///
    /// # Errors
    ///
    /// Returns an internal error if the expiry is out of range or signing fails
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = Duration::try_hours(self.expiry_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Session lifetime of {} hours is out of range",
                    self.expiry_hours
                ))
            })?;
        let claims = Claims {
            sub: user.id.to_string(),
            open_id: user.open_id.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))
    }

    /// Validate a token's signature and expiry
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing why the token was rejected
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired {
                    expired_at: expired_at_of(token).unwrap_or_else(Utc::now),
                },
                ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                    details: e.to_string(),
                },
                _ => JwtValidationError::TokenInvalid {
                    reason: e.to_string(),
                },
            })
    }
}

/// Best-effort read of `exp` from a token whose signature already verified
fn expired_at_of(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    Utc.timestamp_opt(data.claims.exp, 0).single()
}

/// Identity asserted by the external identity provider at sign-in
#[derive(Debug, Clone, Default)]
pub struct LoginIdentity {
    /// External identity key
    pub open_id: String,
    /// Display name
    pub name: Option<String>,
    /// Email
    pub email: Option<String>,
    /// Login method reported by the provider
    pub login_method: Option<String>,
}

/// Result of a completed sign-in
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Stored user after the upsert
    pub user: User,
    /// Fresh session token
    pub token: String,
}

/// Sign-in completion and caller resolution
#[derive(Clone)]
pub struct AuthService {
    database: Arc<dyn DatabaseProvider>,
    sessions: SessionManager,
    owner_open_id: Option<String>,
}

impl AuthService {
    /// Build from the session configuration
    #[must_use]
    pub fn new(database: Arc<dyn DatabaseProvider>, config: &AuthConfig) -> Self {
        Self {
            database,
            sessions: SessionManager::new(config.jwt_secret.as_bytes(), config.jwt_expiry_hours),
            owner_open_id: config.owner_open_id.clone(),
        }
    }

    /// Session token signer
    #[must_use]
    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Role forced on upsert: `admin` for the owner, otherwise left to the store
    fn role_for(&self, open_id: &str) -> Option<UserRole> {
        (self.owner_open_id.as_deref() == Some(open_id)).then_some(UserRole::Admin)
    }

    /// Upsert the signed-in user and issue a session token
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for an empty open id and
    /// `STORAGE_UNAVAILABLE` if the upsert fails
    pub async fn complete_login(&self, identity: LoginIdentity) -> AppResult<LoginOutcome> {
        let role = self.role_for(&identity.open_id);
        let user = self
            .database
            .upsert_user(&UpsertUser {
                open_id: identity.open_id,
                name: identity.name,
                email: identity.email,
                login_method: identity.login_method,
                role,
                last_signed_in: Some(Utc::now()),
            })
            .await?;
        let token = self.sessions.issue_token(&user)?;

        info!(user_id = user.id, role = %user.role, "User signed in");
        Ok(LoginOutcome { user, token })
    }

    /// Resolve the caller from the bearer header or the session cookie
    ///
    /// Returns `None` when no token is present, the token is rejected, or
    /// the user it names no longer exists.
    pub async fn resolve_caller(&self, headers: &HeaderMap) -> Option<User> {
        let token = bearer_token(headers).or_else(|| get_cookie_value(headers, COOKIE_NAME))?;

        let claims = match self.sessions.validate_token(&token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Rejected session token");
                return None;
            }
        };
        let user_id = claims.user_id().ok()?;
        let user = self.database.get_user(user_id).await?;

        (user.open_id == claims.open_id).then_some(user)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}
