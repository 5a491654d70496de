use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::users;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = users)]
pub struct InsertUserEntity {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Columns exposed when a user is embedded in another resource.
#[derive(Debug, Clone, PartialEq, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&UserEntity> for UserSummaryRow {
    fn from(value: &UserEntity) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            email: value.email.clone(),
        }
    }
}
