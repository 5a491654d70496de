use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::plans;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanEntity {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub duration_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = plans)]
pub struct InsertPlanEntity {
    pub name: String,
    pub price: f64,
    pub duration_days: i32,
    pub is_active: bool,
}

/// Partial update. `updated_at` is always set so the changeset is never empty.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = plans)]
pub struct UpdatePlanEntity {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub duration_days: Option<i32>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub duration_days: i32,
}

impl From<&PlanEntity> for PlanSummaryRow {
    fn from(value: &PlanEntity) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            price: value.price,
            duration_days: value.duration_days,
        }
    }
}
