//! Session authentication.
//!
//! Clients send `Authorization: Bearer <token>`. Tokens are issued by the
//! identity provider into the `sessions` table; `SessionVerifier` resolves
//! them to the caller. Handlers take `AuthUser` as an extractor.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Returns the session's user, or `None` for unknown or expired tokens.
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>, AppError>;
}

/// Looks sessions up in Postgres.
pub struct PgSessionVerifier {
    pool: PgPool,
}

impl PgSessionVerifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionVerifier for PgSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>, AppError> {
        let row: Option<(String, Option<String>)> = sqlx::query_as(
            "SELECT user_email, user_name FROM sessions WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(email, name)| AuthUser {
            email: email.to_lowercase(),
            name,
        }))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        match state.sessions.verify(token).await? {
            Some(user) => Ok(user),
            None => {
                tracing::debug!("rejected unknown or expired session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::*;

    /// In-memory token table for handler tests.
    #[derive(Default)]
    pub struct StaticSessionVerifier {
        sessions: HashMap<String, AuthUser>,
    }

    impl StaticSessionVerifier {
        pub fn with(mut self, token: &str, email: &str) -> Self {
            self.sessions.insert(
                token.to_string(),
                AuthUser {
                    email: email.to_string(),
                    name: None,
                },
            );
            self
        }
    }

    #[async_trait]
    impl SessionVerifier for StaticSessionVerifier {
        async fn verify(&self, token: &str) -> Result<Option<AuthUser>, AppError> {
            Ok(self.sessions.get(token).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer  abc123 ")), Some("abc123"));
    }

    #[test]
    fn malformed_authorization_is_rejected() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
