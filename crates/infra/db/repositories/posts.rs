use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use super::map_write_error;
use crate::domain::{
    entities::posts::{InsertPostEntity, PostEntity},
    repositories::posts::PostRepository,
};
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::posts};

pub struct PostPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PostPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PostRepository for PostPostgres {
    async fn list_page(&self, limit: i64, offset: i64) -> Result<Vec<PostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = posts::table
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(PostEntity::as_select())
            .load::<PostEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = posts::table.count().get_result::<i64>(&mut conn)?;

        Ok(total)
    }

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<PostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = posts::table
            .filter(posts::id.eq(post_id))
            .select(PostEntity::as_select())
            .first::<PostEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn create(&self, insert_post_entity: InsertPostEntity) -> Result<PostEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(posts::table)
            .values(&insert_post_entity)
            .returning(PostEntity::as_returning())
            .get_result::<PostEntity>(&mut conn)
            .map_err(map_write_error)
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(posts::table.filter(posts::id.eq(post_id))).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
