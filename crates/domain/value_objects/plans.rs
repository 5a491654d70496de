use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::plans::{PlanEntity, PlanSummaryRow};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanModel {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    /// Days of validity granted by a subscription to this plan.
    #[serde(rename = "duration")]
    pub duration_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanEntity> for PlanModel {
    fn from(value: PlanEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price: value.price,
            duration_days: value.duration_days,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSummaryModel {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    #[serde(rename = "duration")]
    pub duration_days: i32,
}

impl From<PlanSummaryRow> for PlanSummaryModel {
    fn from(value: PlanSummaryRow) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price: value.price,
            duration_days: value.duration_days,
        }
    }
}

/// Create payload. Every field is optional so missing ones can be reported together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertPlanModel {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanModel {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i64>,
    pub is_active: Option<bool>,
}
