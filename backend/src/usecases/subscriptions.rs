use std::sync::Arc;

use anyhow::anyhow;
use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use subdesk_core::domain::{
    entities::{plans::PlanEntity, subscriptions::InsertSubscriptionEntity, users::UserEntity},
    repositories::{
        plans::PlanRepository, subscriptions::SubscriptionRepository, users::UserRepository,
    },
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        persistence::PersistenceConflict,
        subscriptions::{
            InsertSubscriptionModel, ListSubscriptionsQuery, SubscriptionDetail,
            SubscriptionFilter, SubscriptionModel,
        },
    },
};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::validation::{ValidationError, parse_object_id, present, require_fields};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("User not found")]
    UserNotFound,
    #[error("Plan not found")]
    PlanNotFound,
    #[error("This plan is not available")]
    PlanUnavailable,
    #[error("User already has an active subscription for this plan")]
    AlreadyActive,
    #[error("Subscription not found")]
    SubscriptionNotFound,
    #[error("Subscription is already cancelled")]
    AlreadyCancelled,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::Validation(_)
            | SubscriptionError::PlanUnavailable
            | SubscriptionError::AlreadyCancelled => StatusCode::BAD_REQUEST,
            SubscriptionError::UserNotFound
            | SubscriptionError::PlanNotFound
            | SubscriptionError::SubscriptionNotFound => StatusCode::NOT_FOUND,
            SubscriptionError::AlreadyActive => StatusCode::CONFLICT,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SubscriptionError::Validation(err) => err.code,
            SubscriptionError::UserNotFound => "USER_NOT_FOUND",
            SubscriptionError::PlanNotFound => "PLAN_NOT_FOUND",
            SubscriptionError::PlanUnavailable => "PLAN_UNAVAILABLE",
            SubscriptionError::AlreadyActive => "SUBSCRIPTION_ALREADY_ACTIVE",
            SubscriptionError::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            SubscriptionError::AlreadyCancelled => "SUBSCRIPTION_ALREADY_CANCELLED",
            SubscriptionError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<S, P, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    subscription_repository: Arc<S>,
    plan_repository: Arc<P>,
    user_repository: Arc<U>,
}

impl<S, P, U> SubscriptionUseCase<S, P, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(
        subscription_repository: Arc<S>,
        plan_repository: Arc<P>,
        user_repository: Arc<U>,
    ) -> Self {
        Self {
            subscription_repository,
            plan_repository,
            user_repository,
        }
    }

    pub async fn create_subscription(
        &self,
        insert_subscription_model: InsertSubscriptionModel,
    ) -> UseCaseResult<SubscriptionModel> {
        require_fields(&[
            ("userId", present(&insert_subscription_model.user_id)),
            ("planId", present(&insert_subscription_model.plan_id)),
        ])?;

        let user_id = parse_object_id(
            insert_subscription_model.user_id.as_deref().unwrap_or_default(),
            "User ID",
            "userId",
        )?;
        let plan_id = parse_object_id(
            insert_subscription_model.plan_id.as_deref().unwrap_or_default(),
            "Plan ID",
            "planId",
        )?;

        let user = self.find_user(user_id).await?;
        let plan = self.find_plan(plan_id).await?;
        if !plan.is_active {
            info!(%user_id, %plan_id, "subscriptions: plan is inactive");
            return Err(SubscriptionError::PlanUnavailable);
        }

        let now = Utc::now();
        self.expire_lapsed(now, Some(user_id)).await?;

        let existing = self
            .subscription_repository
            .find_active_for_user_plan(user_id, plan_id)
            .await
            .map_err(|err| {
                error!(%user_id, %plan_id, db_error = ?err, "subscriptions: failed to check active subscription");
                SubscriptionError::Internal(err)
            })?;
        if existing.is_some() {
            info!(%user_id, %plan_id, "subscriptions: already active");
            return Err(SubscriptionError::AlreadyActive);
        }

        let end_date = now
            .checked_add_signed(Duration::days(i64::from(plan.duration_days)))
            .ok_or_else(|| anyhow!("plan duration overflows the calendar"))?;

        let subscription = self
            .subscription_repository
            .create(InsertSubscriptionEntity {
                user_id,
                plan_id,
                start_date: now,
                end_date,
                status: SubscriptionStatus::Active.to_string(),
            })
            .await
            .map_err(|err| match PersistenceConflict::from_error(&err) {
                Some(PersistenceConflict::Unique { .. }) => {
                    info!(%user_id, %plan_id, "subscriptions: lost race to an active subscription");
                    SubscriptionError::AlreadyActive
                }
                Some(PersistenceConflict::ForeignKey { constraint }) if constraint.contains("user") => {
                    SubscriptionError::UserNotFound
                }
                Some(PersistenceConflict::ForeignKey { .. }) => SubscriptionError::PlanNotFound,
                None => {
                    error!(%user_id, %plan_id, db_error = ?err, "subscriptions: failed to insert subscription");
                    SubscriptionError::Internal(err)
                }
            })?;

        info!(
            subscription_id = %subscription.id,
            %user_id,
            %plan_id,
            end_date = %subscription.end_date,
            "subscriptions: subscription created"
        );

        Ok(SubscriptionModel::from(SubscriptionDetail {
            subscription,
            user: (&user).into(),
            plan: (&plan).into(),
        }))
    }

    pub async fn list_subscriptions(
        &self,
        query: ListSubscriptionsQuery,
    ) -> UseCaseResult<Vec<SubscriptionModel>> {
        let status = query
            .status
            .as_deref()
            .filter(|status| !status.is_empty())
            .map(|status| {
                status.parse::<SubscriptionStatus>().map_err(|_| {
                    ValidationError::invalid(
                        "status",
                        format!(
                            "Invalid status '{}'. Expected one of: active, cancel, expired",
                            status
                        ),
                    )
                })
            })
            .transpose()?;
        let user_id = query
            .user_id
            .as_deref()
            .filter(|user_id| !user_id.is_empty())
            .map(|user_id| parse_object_id(user_id, "User ID", "userId"))
            .transpose()?;

        self.expire_lapsed(Utc::now(), user_id).await?;

        let subscriptions = self
            .subscription_repository
            .list(SubscriptionFilter { status, user_id })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "subscriptions: failed to list subscriptions");
                SubscriptionError::Internal(err)
            })?;

        debug!(count = subscriptions.len(), "subscriptions: listed");
        Ok(subscriptions
            .into_iter()
            .map(SubscriptionModel::from)
            .collect())
    }

    pub async fn get_subscription(&self, raw_subscription_id: &str) -> UseCaseResult<SubscriptionModel> {
        let subscription_id = parse_object_id(raw_subscription_id, "Subscription ID", "id")?;
        let mut detail = self.find_subscription(subscription_id).await?;

        let now = Utc::now();
        if detail.is_lapsed(now) {
            self.expire_lapsed(now, Some(detail.user.id)).await?;
            // A concurrent cancel may have won; report what the row holds now.
            detail = self.find_subscription(subscription_id).await?;
        }

        Ok(SubscriptionModel::from(detail))
    }

    pub async fn cancel_subscription(
        &self,
        raw_subscription_id: &str,
    ) -> UseCaseResult<SubscriptionModel> {
        let subscription_id = parse_object_id(raw_subscription_id, "Subscription ID", "id")?;
        let mut detail = self.find_subscription(subscription_id).await?;

        if detail.subscription.status == SubscriptionStatus::Cancel.to_string() {
            info!(%subscription_id, "subscriptions: already cancelled");
            return Err(SubscriptionError::AlreadyCancelled);
        }

        let cancelled = self
            .subscription_repository
            .cancel(subscription_id)
            .await
            .map_err(|err| {
                error!(%subscription_id, db_error = ?err, "subscriptions: failed to cancel subscription");
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                info!(%subscription_id, "subscriptions: cancelled concurrently");
                SubscriptionError::AlreadyCancelled
            })?;

        info!(%subscription_id, "subscriptions: subscription cancelled");
        detail.subscription = cancelled;
        Ok(SubscriptionModel::from(detail))
    }

    /// Expires every lapsed subscription. Returns how many rows changed.
    pub async fn sweep_lapsed(&self) -> UseCaseResult<usize> {
        self.expire_lapsed(Utc::now(), None).await
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>, user_id: Option<Uuid>) -> UseCaseResult<usize> {
        let expired = self
            .subscription_repository
            .expire_lapsed(now, user_id)
            .await
            .map_err(|err| {
                error!(user_id = ?user_id, db_error = ?err, "subscriptions: failed to expire lapsed subscriptions");
                SubscriptionError::Internal(err)
            })?;

        if expired > 0 {
            info!(user_id = ?user_id, expired, "subscriptions: lapsed subscriptions expired");
        }
        Ok(expired)
    }

    async fn find_user(&self, user_id: Uuid) -> UseCaseResult<UserEntity> {
        self.user_repository
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load user");
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, "subscriptions: user not found");
                SubscriptionError::UserNotFound
            })
    }

    async fn find_plan(&self, plan_id: Uuid) -> UseCaseResult<PlanEntity> {
        self.plan_repository
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "subscriptions: failed to load plan");
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%plan_id, "subscriptions: plan not found");
                SubscriptionError::PlanNotFound
            })
    }

    async fn find_subscription(&self, subscription_id: Uuid) -> UseCaseResult<SubscriptionDetail> {
        self.subscription_repository
            .find_by_id(subscription_id)
            .await
            .map_err(|err| {
                error!(%subscription_id, db_error = ?err, "subscriptions: failed to load subscription");
                SubscriptionError::Internal(err)
            })?
            .ok_or(SubscriptionError::SubscriptionNotFound)
    }
}

#[cfg(test)]
mod tests;
