use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use subdesk_core::domain::{
    repositories::{passwords::PasswordHashing, users::UserRepository},
    value_objects::iam::{LoginModel, RegisterUserModel},
};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::identity::IdentityUseCase,
};

pub fn routes<U, H>(identity_usecase: Arc<IdentityUseCase<U, H>>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHashing + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(register::<U, H>))
        .route("/login", post(login::<U, H>))
        .route("/me", get(me))
        .with_state(identity_usecase)
}

pub async fn register<U, H>(
    State(identity_usecase): State<Arc<IdentityUseCase<U, H>>>,
    payload: Result<Json<RegisterUserModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHashing + Send + Sync + 'static,
{
    let Json(register_user_model) = payload?;
    let user = identity_usecase.register(register_user_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

pub async fn login<U, H>(
    State(identity_usecase): State<Arc<IdentityUseCase<U, H>>>,
    payload: Result<Json<LoginModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHashing + Send + Sync + 'static,
{
    let Json(login_model) = payload?;
    let result = identity_usecase.login(login_model).await?;

    Ok(Json(json!({
        "ok": true,
        "message": "Login successful",
        "token": result.token,
        "user": result.user,
    })))
}

pub async fn me(auth: AuthUser) -> impl IntoResponse {
    Json(json!({ "ok": true, "user": auth }))
}
