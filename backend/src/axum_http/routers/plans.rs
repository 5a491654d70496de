use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use subdesk_core::domain::{
    repositories::plans::PlanRepository,
    value_objects::plans::{InsertPlanModel, UpdatePlanModel},
};

use crate::{
    auth::{AuthUser, authorizer::ADMIN_ONLY},
    axum_http::error_responses::AppError,
    usecases::plans::PlanUseCase,
};

pub fn routes<P>(plan_usecase: Arc<PlanUseCase<P>>) -> Router
where
    P: PlanRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_plans::<P>).post(create_plan::<P>))
        .route(
            "/:id",
            get(get_plan::<P>)
                .put(update_plan::<P>)
                .delete(delete_plan::<P>),
        )
        .with_state(plan_usecase)
}

pub async fn list_plans<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
{
    let plans = plan_usecase.list_plans().await?;
    Ok(Json(json!({ "ok": true, "count": plans.len(), "plans": plans })))
}

pub async fn get_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
{
    let plan = plan_usecase.get_plan(&plan_id).await?;
    Ok(Json(json!({ "ok": true, "plan": plan })))
}

pub async fn create_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    auth: AuthUser,
    payload: Result<Json<InsertPlanModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
{
    auth.require_any(ADMIN_ONLY)?;
    let Json(insert_plan_model) = payload?;
    let plan = plan_usecase.create_plan(insert_plan_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "message": "Plan created successfully",
            "plan": plan,
        })),
    ))
}

pub async fn update_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    auth: AuthUser,
    Path(plan_id): Path<String>,
    payload: Result<Json<UpdatePlanModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
{
    auth.require_any(ADMIN_ONLY)?;
    let Json(update_plan_model) = payload?;
    let plan = plan_usecase.update_plan(&plan_id, update_plan_model).await?;

    Ok(Json(json!({
        "ok": true,
        "message": "Plan updated successfully",
        "plan": plan,
    })))
}

pub async fn delete_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    auth: AuthUser,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanRepository + Send + Sync + 'static,
{
    auth.require_any(ADMIN_ONLY)?;
    plan_usecase.delete_plan(&plan_id).await?;

    Ok(Json(json!({ "ok": true, "message": "Plan deleted successfully" })))
}
