use std::sync::Arc;

use axum::http::StatusCode;
use subdesk_core::domain::{
    entities::users::InsertUserEntity,
    repositories::{passwords::PasswordHashing, users::UserRepository},
    value_objects::{
        enums::roles::Role,
        iam::{LoginModel, LoginResultModel, RegisterUserModel, UserModel},
        persistence::PersistenceConflict,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};

use super::validation::{ValidationError, is_valid_email, present, require_fields};
use crate::auth::tokens::TokenKeys;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 6;

/// Well-formed argon2id hash matching no password; verified against on unknown emails.
pub(crate) const UNKNOWN_USER_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IdentityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
            IdentityError::EmailTaken => StatusCode::CONFLICT,
            IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            IdentityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::Validation(err) => err.code,
            IdentityError::EmailTaken => "EMAIL_ALREADY_REGISTERED",
            IdentityError::InvalidCredentials => "INVALID_CREDENTIALS",
            IdentityError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, IdentityError>;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct IdentityUseCase<U, H>
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHashing + Send + Sync + 'static,
{
    user_repository: Arc<U>,
    password_hasher: Arc<H>,
    token_keys: Arc<TokenKeys>,
}

impl<U, H> IdentityUseCase<U, H>
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHashing + Send + Sync + 'static,
{
    pub fn new(user_repository: Arc<U>, password_hasher: Arc<H>, token_keys: Arc<TokenKeys>) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_keys,
        }
    }

    pub async fn register(&self, register_user_model: RegisterUserModel) -> UseCaseResult<UserModel> {
        require_fields(&[
            ("name", present(&register_user_model.name)),
            ("email", present(&register_user_model.email)),
            ("password", present(&register_user_model.password)),
        ])?;

        let name = register_user_model.name.unwrap_or_default().trim().to_string();
        let email = normalize_email(&register_user_model.email.unwrap_or_default());
        let password = register_user_model.password.unwrap_or_default();

        let name_chars = name.chars().count();
        if name_chars < NAME_MIN_CHARS {
            return Err(ValidationError::invalid(
                "name",
                format!("Name must be at least {} characters", NAME_MIN_CHARS),
            )
            .into());
        }
        if name_chars > NAME_MAX_CHARS {
            return Err(ValidationError::invalid(
                "name",
                format!("Name cannot exceed {} characters", NAME_MAX_CHARS),
            )
            .into());
        }
        if !is_valid_email(&email) {
            return Err(ValidationError::invalid("email", "Invalid email format").into());
        }
        if password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(ValidationError::invalid(
                "password",
                format!("Password must be at least {} characters", PASSWORD_MIN_CHARS),
            )
            .into());
        }

        let existing = self
            .user_repository
            .find_by_email(&email)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "identity: failed to look up email");
                IdentityError::Internal(err)
            })?;
        if existing.is_some() {
            info!("identity: registration rejected, email taken");
            return Err(IdentityError::EmailTaken);
        }

        let password_hash = self.password_hasher.hash_password(&password).await.map_err(|err| {
            error!(error = ?err, "identity: failed to hash password");
            IdentityError::Internal(err)
        })?;

        let user = self
            .user_repository
            .create(InsertUserEntity {
                name,
                email,
                password_hash,
                role: Role::User.to_string(),
            })
            .await
            .map_err(|err| match PersistenceConflict::from_error(&err) {
                Some(PersistenceConflict::Unique { .. }) => {
                    info!("identity: registration lost race on email");
                    IdentityError::EmailTaken
                }
                _ => {
                    error!(db_error = ?err, "identity: failed to insert user");
                    IdentityError::Internal(err)
                }
            })?;

        info!(user_id = %user.id, "identity: user registered");
        Ok(UserModel::from(user))
    }

    pub async fn login(&self, login_model: LoginModel) -> UseCaseResult<LoginResultModel> {
        require_fields(&[
            ("email", present(&login_model.email)),
            ("password", present(&login_model.password)),
        ])?;

        let email = normalize_email(&login_model.email.unwrap_or_default());
        let password = login_model.password.unwrap_or_default();

        let user = self
            .user_repository
            .find_by_email(&email)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "identity: failed to look up email");
                IdentityError::Internal(err)
            })?;
        let Some(user) = user else {
            // Same hashing cost as a wrong password.
            if let Err(err) = self
                .password_hasher
                .verify_password(&password, UNKNOWN_USER_PASSWORD_HASH)
                .await
            {
                warn!(error = ?err, "identity: placeholder verification failed");
            }
            warn!("identity: login for unknown email");
            return Err(IdentityError::InvalidCredentials);
        };

        let verified = self
            .password_hasher
            .verify_password(&password, &user.password_hash)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, error = ?err, "identity: password verification failed");
                IdentityError::Internal(err)
            })?;
        if !verified {
            warn!(user_id = %user.id, "identity: wrong password");
            return Err(IdentityError::InvalidCredentials);
        }

        let token = self.token_keys.issue(user.id).map_err(|err| {
            error!(user_id = %user.id, error = ?err, "identity: failed to issue token");
            IdentityError::Internal(err)
        })?;

        info!(user_id = %user.id, "identity: login succeeded");
        Ok(LoginResultModel {
            token,
            user: UserModel::from(user),
        })
    }
}
