use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use super::map_write_error;
use crate::domain::{
    entities::{
        plans::PlanSummaryRow,
        subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
        users::UserSummaryRow,
    },
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        subscriptions::{SubscriptionDetail, SubscriptionFilter},
    },
};
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{plans, subscriptions, users},
};

type DetailRow = (SubscriptionEntity, UserSummaryRow, PlanSummaryRow);

fn into_detail((subscription, user, plan): DetailRow) -> SubscriptionDetail {
    SubscriptionDetail {
        subscription,
        user,
        plan,
    }
}

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionDetail>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = subscriptions::table
            .inner_join(users::table)
            .inner_join(plans::table)
            .filter(subscriptions::id.eq(subscription_id))
            .select((
                SubscriptionEntity::as_select(),
                UserSummaryRow::as_select(),
                PlanSummaryRow::as_select(),
            ))
            .first::<DetailRow>(&mut conn)
            .optional()?;

        Ok(row.map(into_detail))
    }

    async fn find_active_for_user_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::plan_id.eq(plan_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(subscriptions::table)
            .values(&insert_subscription_entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .map_err(map_write_error)
    }

    async fn list(&self, filter: SubscriptionFilter) -> Result<Vec<SubscriptionDetail>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = subscriptions::table
            .inner_join(users::table)
            .inner_join(plans::table)
            .select((
                SubscriptionEntity::as_select(),
                UserSummaryRow::as_select(),
                PlanSummaryRow::as_select(),
            ))
            .order(subscriptions::created_at.desc())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(subscriptions::status.eq(status.to_string()));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(subscriptions::user_id.eq(user_id));
        }

        let rows = query.load::<DetailRow>(&mut conn)?;

        Ok(rows.into_iter().map(into_detail).collect())
    }

    async fn cancel(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(subscriptions::table)
            .filter(subscriptions::id.eq(subscription_id))
            .filter(subscriptions::status.ne(SubscriptionStatus::Cancel.to_string()))
            .set((
                subscriptions::status.eq(SubscriptionStatus::Cancel.to_string()),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>, user_id: Option<Uuid>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let lapsed = update(subscriptions::table)
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .filter(subscriptions::end_date.lt(now));
        let changes = (
            subscriptions::status.eq(SubscriptionStatus::Expired.to_string()),
            subscriptions::updated_at.eq(now),
        );

        let expired = match user_id {
            Some(user_id) => lapsed
                .filter(subscriptions::user_id.eq(user_id))
                .set(changes)
                .execute(&mut conn)?,
            None => lapsed.set(changes).execute(&mut conn)?,
        };

        Ok(expired)
    }
}
