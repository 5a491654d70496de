use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::{
    auth::{AuthError, authorizer::AccessDenied},
    usecases::{
        identity::IdentityError, plans::PlanError, posts::PostError,
        subscriptions::SubscriptionError, validation::ValidationError,
    },
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub ok: bool,
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", .0.message)]
    BadRequest(ValidationError),

    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    /// A 500 that keeps a stable `code`; the cause is logged where it occurred.
    #[error("{message}")]
    Failure {
        code: &'static str,
        message: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        AppError::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Failure { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the variant matching `status`; unexpected statuses become internal errors.
    fn from_status(status: StatusCode, code: &'static str, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => AppError::BadRequest(ValidationError {
                code,
                message,
                field: None,
                missing_fields: Vec::new(),
            }),
            StatusCode::UNAUTHORIZED => AppError::Unauthorized { code, message },
            StatusCode::FORBIDDEN => AppError::Forbidden { message },
            StatusCode::NOT_FOUND => AppError::NotFound { code, message },
            StatusCode::CONFLICT => AppError::Conflict { code, message },
            _ => AppError::Internal(anyhow::anyhow!("{}: {}", code, message)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::BadRequest(validation) => ErrorResponse {
                ok: false,
                message: validation.message,
                code: validation.code,
                field: validation.field,
                missing_fields: validation.missing_fields,
            },
            AppError::Unauthorized { code, message }
            | AppError::NotFound { code, message }
            | AppError::Conflict { code, message }
            | AppError::Failure { code, message, .. } => ErrorResponse {
                ok: false,
                message,
                code,
                field: None,
                missing_fields: Vec::new(),
            },
            AppError::Forbidden { message } => ErrorResponse {
                ok: false,
                message,
                code: "FORBIDDEN",
                field: None,
                missing_fields: Vec::new(),
            },
            AppError::Internal(err) => {
                // Don't leak internal error detail to client
                error!(error = ?err, "http: internal error");
                ErrorResponse {
                    ok: false,
                    message: "Internal server error".to_string(),
                    code: "INTERNAL_ERROR",
                    field: None,
                    missing_fields: Vec::new(),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(err) => AppError::Internal(err),
            other => AppError::Unauthorized {
                code: "UNAUTHORIZED",
                message: other.public_message(),
            },
        }
    }
}

impl From<AccessDenied> for AppError {
    fn from(err: AccessDenied) -> Self {
        AppError::Forbidden {
            message: err.to_string(),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Validation(validation) => AppError::BadRequest(validation),
            IdentityError::Internal(err) => AppError::Internal(err),
            other => AppError::from_status(other.status_code(), other.code(), other.to_string()),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Validation(validation) => AppError::BadRequest(validation),
            PlanError::Internal(err) => AppError::Internal(err),
            other => AppError::from_status(other.status_code(), other.code(), other.to_string()),
        }
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::Validation(validation) => AppError::BadRequest(validation),
            SubscriptionError::Internal(err) => AppError::Internal(err),
            other => AppError::from_status(other.status_code(), other.code(), other.to_string()),
        }
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Validation(validation) => AppError::BadRequest(validation),
            PostError::Internal(err) => AppError::Internal(err),
            PostError::UploadFailed(cause) => AppError::Failure {
                code: "UPLOAD_FAILED",
                message: "File upload failed".to_string(),
                cause,
            },
            other => AppError::from_status(other.status_code(), other.code(), other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(ValidationError::malformed_body(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(ValidationError::malformed_body(rejection.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(ValidationError::malformed_body(rejection.body_text()))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(ValidationError::malformed_body(err.to_string()))
    }
}
