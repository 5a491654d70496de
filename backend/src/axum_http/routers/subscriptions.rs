use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde_json::json;
use subdesk_core::domain::{
    repositories::{
        plans::PlanRepository, subscriptions::SubscriptionRepository, users::UserRepository,
    },
    value_objects::subscriptions::{InsertSubscriptionModel, ListSubscriptionsQuery},
};

use crate::{
    auth::{AuthUser, authorizer::ADMIN_ONLY},
    axum_http::error_responses::AppError,
    usecases::subscriptions::SubscriptionUseCase,
};

pub fn routes<S, P, U>(subscription_usecase: Arc<SubscriptionUseCase<S, P, U>>) -> Router
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(list_subscriptions::<S, P, U>).post(create_subscription::<S, P, U>),
        )
        .route("/:id", get(get_subscription::<S, P, U>))
        .route("/:id/cancel", put(cancel_subscription::<S, P, U>))
        .with_state(subscription_usecase)
}

pub async fn create_subscription<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    _auth: AuthUser,
    payload: Result<Json<InsertSubscriptionModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Json(insert_subscription_model) = payload?;
    let subscription = subscription_usecase
        .create_subscription(insert_subscription_model)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "message": "Subscription created successfully",
            "subscription": subscription,
        })),
    ))
}

pub async fn list_subscriptions<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    auth: AuthUser,
    query: Result<Query<ListSubscriptionsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    auth.require_any(ADMIN_ONLY)?;
    let Query(query) = query?;
    let subscriptions = subscription_usecase.list_subscriptions(query).await?;

    Ok(Json(json!({
        "ok": true,
        "count": subscriptions.len(),
        "subscriptions": subscriptions,
    })))
}

pub async fn get_subscription<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    _auth: AuthUser,
    Path(subscription_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase
        .get_subscription(&subscription_id)
        .await?;

    Ok(Json(json!({ "ok": true, "subscription": subscription })))
}

pub async fn cancel_subscription<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    _auth: AuthUser,
    Path(subscription_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let subscription = subscription_usecase
        .cancel_subscription(&subscription_id)
        .await?;

    Ok(Json(json!({
        "ok": true,
        "message": "Subscription cancelled successfully",
        "subscription": subscription,
    })))
}
