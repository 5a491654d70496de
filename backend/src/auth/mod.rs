pub mod authorizer;
pub mod tokens;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use subdesk_core::domain::{
    entities::users::UserEntity, repositories::users::UserRepository,
    value_objects::enums::roles::Role,
};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;
use tokens::TokenKeys;

/// The caller a request was authenticated as.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(rename = "id")]
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<UserEntity> for AuthUser {
    fn from(entity: UserEntity) -> Self {
        Self {
            user_id: entity.id,
            name: entity.name,
            email: entity.email,
            role: entity.role.parse().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header must start with Bearer")]
    MissingBearer,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    #[error("session subject no longer exists")]
    UnknownSubject,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-facing text; token failures stay vague.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::MissingBearer => self.to_string(),
            AuthError::InvalidToken(_) | AuthError::UnknownSubject => "Unauthorized".to_string(),
            AuthError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// Returns the token part of a `Bearer <token>` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingBearer)
}

/// Resolves an `Authorization` header value into the calling user.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthUser, AuthError>;
}

pub struct SessionAuthenticator<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    token_keys: Arc<TokenKeys>,
    user_repository: Arc<U>,
}

impl<U> SessionAuthenticator<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(token_keys: Arc<TokenKeys>, user_repository: Arc<U>) -> Self {
        Self {
            token_keys,
            user_repository,
        }
    }
}

#[async_trait]
impl<U> SessionResolver for SessionAuthenticator<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthUser, AuthError> {
        let token = bearer_token(authorization)?;

        let claims = self.token_keys.verify(token).map_err(|err| {
            warn!(token_error = %err, "auth: rejected session token");
            AuthError::InvalidToken(err.to_string())
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))?;

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "auth: failed to load session user");
                AuthError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, "auth: token subject not found");
                AuthError::UnknownSubject
            })?;

        Ok(AuthUser::from(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resolver = parts
            .extensions
            .get::<Arc<dyn SessionResolver>>()
            .cloned()
            .ok_or_else(|| AppError::from(anyhow::anyhow!("session resolver is not installed")))?;

        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        Ok(resolver.authenticate(authorization).await?)
    }
}
