use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    value_objects::subscriptions::{SubscriptionDetail, SubscriptionFilter},
};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionDetail>>;

    async fn find_active_for_user_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Fails with `PersistenceConflict::Unique` when the pair already holds an active row.
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity>;

    /// Newest first.
    async fn list(&self, filter: SubscriptionFilter) -> Result<Vec<SubscriptionDetail>>;

    /// Sets status to `cancel` unless it already is. `None` means nothing was updated.
    async fn cancel(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    /// Moves active rows whose end date is before `now` to `expired`.
    async fn expire_lapsed(&self, now: DateTime<Utc>, user_id: Option<Uuid>) -> Result<usize>;
}
