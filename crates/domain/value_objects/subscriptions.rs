use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{plans::PlanSummaryRow, subscriptions::SubscriptionEntity, users::UserSummaryRow},
    value_objects::{enums::subscription_statuses::SubscriptionStatus, plans::PlanSummaryModel},
};

/// A subscription row joined with the user and plan it references.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDetail {
    pub subscription: SubscriptionEntity,
    pub user: UserSummaryRow,
    pub plan: PlanSummaryRow,
}

impl SubscriptionDetail {
    /// Stored as active but already past its end date.
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.subscription.status == SubscriptionStatus::Active.to_string()
            && self.subscription.end_date < now
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFilter {
    pub status: Option<SubscriptionStatus>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriberModel {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<UserSummaryRow> for SubscriberModel {
    fn from(value: UserSummaryRow) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionModel {
    pub id: Uuid,
    pub user: SubscriberModel,
    pub plan: PlanSummaryModel,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionDetail> for SubscriptionModel {
    fn from(value: SubscriptionDetail) -> Self {
        let SubscriptionDetail {
            subscription,
            user,
            plan,
        } = value;

        Self {
            id: subscription.id,
            user: user.into(),
            plan: plan.into(),
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            // Rows are constrained to known statuses; anything else reads as expired.
            status: subscription
                .status
                .parse()
                .unwrap_or(SubscriptionStatus::Expired),
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

/// Create payload. Ids arrive as strings so malformed values get a typed error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertSubscriptionModel {
    pub user_id: Option<String>,
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubscriptionsQuery {
    pub status: Option<String>,
    pub user_id: Option<String>,
}
