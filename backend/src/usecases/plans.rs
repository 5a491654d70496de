use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use subdesk_core::domain::{
    entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity},
    repositories::plans::PlanRepository,
    value_objects::{
        persistence::PersistenceConflict,
        plans::{InsertPlanModel, PlanModel, UpdatePlanModel},
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use super::validation::{ValidationError, parse_object_id, present, require_fields};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Plan not found")]
    PlanNotFound,
    #[error("A plan with this name already exists")]
    DuplicateName,
    #[error("Plan is referenced by existing subscriptions")]
    InUse,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlanError::Validation(_) => StatusCode::BAD_REQUEST,
            PlanError::PlanNotFound => StatusCode::NOT_FOUND,
            PlanError::DuplicateName | PlanError::InUse => StatusCode::CONFLICT,
            PlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PlanError::Validation(err) => err.code,
            PlanError::PlanNotFound => "PLAN_NOT_FOUND",
            PlanError::DuplicateName => "DUPLICATE_ENTRY",
            PlanError::InUse => "PLAN_IN_USE",
            PlanError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PlanError>;

fn validate_name(name: String) -> Result<String, ValidationError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::invalid("name", "Name cannot be empty"));
    }
    Ok(name)
}

fn validate_price(price: f64) -> Result<f64, ValidationError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::invalid(
            "price",
            "Price must be a non-negative number",
        ));
    }
    Ok(price)
}

/// Upper bound keeps `start + duration` inside the calendar for every subscription.
pub const MAX_DURATION_DAYS: i32 = 36_500;

fn validate_duration(duration: i64) -> Result<i32, ValidationError> {
    i32::try_from(duration)
        .ok()
        .filter(|days| (1..=MAX_DURATION_DAYS).contains(days))
        .ok_or_else(|| {
            ValidationError::invalid(
                "duration",
                format!("Duration must be between 1 and {} days", MAX_DURATION_DAYS),
            )
        })
}

fn map_write_conflict(err: anyhow::Error) -> PlanError {
    match PersistenceConflict::from_error(&err) {
        Some(PersistenceConflict::Unique { .. }) => PlanError::DuplicateName,
        Some(PersistenceConflict::ForeignKey { .. }) => PlanError::InUse,
        None => PlanError::Internal(err),
    }
}

pub struct PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    plan_repository: Arc<P>,
}

impl<P> PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(plan_repository: Arc<P>) -> Self {
        Self { plan_repository }
    }

    pub async fn list_plans(&self) -> UseCaseResult<Vec<PlanModel>> {
        let plans = self.plan_repository.list_plans().await.map_err(|err| {
            error!(db_error = ?err, "plans: failed to list plans");
            PlanError::Internal(err)
        })?;

        Ok(plans.into_iter().map(PlanModel::from).collect())
    }

    pub async fn get_plan(&self, raw_plan_id: &str) -> UseCaseResult<PlanModel> {
        let plan_id = parse_object_id(raw_plan_id, "Plan ID", "id")?;
        self.find_plan(plan_id).await.map(PlanModel::from)
    }

    pub async fn create_plan(&self, insert_plan_model: InsertPlanModel) -> UseCaseResult<PlanModel> {
        require_fields(&[
            ("name", present(&insert_plan_model.name)),
            ("price", insert_plan_model.price.is_some()),
            ("duration", insert_plan_model.duration.is_some()),
        ])?;

        let insert_plan_entity = InsertPlanEntity {
            name: validate_name(insert_plan_model.name.unwrap_or_default())?,
            price: validate_price(insert_plan_model.price.unwrap_or_default())?,
            duration_days: validate_duration(insert_plan_model.duration.unwrap_or_default())?,
            is_active: insert_plan_model.is_active.unwrap_or(true),
        };

        let plan = self
            .plan_repository
            .create(insert_plan_entity)
            .await
            .map_err(|err| {
                let mapped = map_write_conflict(err);
                if let PlanError::Internal(err) = &mapped {
                    error!(db_error = ?err, "plans: failed to insert plan");
                }
                mapped
            })?;

        info!(plan_id = %plan.id, "plans: plan created");
        Ok(PlanModel::from(plan))
    }

    pub async fn update_plan(
        &self,
        raw_plan_id: &str,
        update_plan_model: UpdatePlanModel,
    ) -> UseCaseResult<PlanModel> {
        let plan_id = parse_object_id(raw_plan_id, "Plan ID", "id")?;

        let update_plan_entity = UpdatePlanEntity {
            name: update_plan_model.name.map(validate_name).transpose()?,
            price: update_plan_model.price.map(validate_price).transpose()?,
            duration_days: update_plan_model
                .duration
                .map(validate_duration)
                .transpose()?,
            is_active: update_plan_model.is_active,
            updated_at: Utc::now(),
        };

        let plan = self
            .plan_repository
            .update(plan_id, update_plan_entity)
            .await
            .map_err(|err| {
                let mapped = map_write_conflict(err);
                if let PlanError::Internal(err) = &mapped {
                    error!(%plan_id, db_error = ?err, "plans: failed to update plan");
                }
                mapped
            })?
            .ok_or(PlanError::PlanNotFound)?;

        info!(%plan_id, "plans: plan updated");
        Ok(PlanModel::from(plan))
    }

    pub async fn delete_plan(&self, raw_plan_id: &str) -> UseCaseResult<()> {
        let plan_id = parse_object_id(raw_plan_id, "Plan ID", "id")?;

        let deleted = self.plan_repository.delete(plan_id).await.map_err(|err| {
            let mapped = map_write_conflict(err);
            if let PlanError::Internal(err) = &mapped {
                error!(%plan_id, db_error = ?err, "plans: failed to delete plan");
            }
            mapped
        })?;
        if !deleted {
            return Err(PlanError::PlanNotFound);
        }

        info!(%plan_id, "plans: plan deleted");
        Ok(())
    }

    async fn find_plan(&self, plan_id: Uuid) -> UseCaseResult<PlanEntity> {
        self.plan_repository
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "plans: failed to load plan");
                PlanError::Internal(err)
            })?
            .ok_or(PlanError::PlanNotFound)
    }
}
