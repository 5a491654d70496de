use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::posts::{InsertPostEntity, PostEntity};

#[automock]
#[async_trait]
pub trait PostRepository {
    async fn list_page(&self, limit: i64, offset: i64) -> Result<Vec<PostEntity>>;
    async fn count(&self) -> Result<i64>;
    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<PostEntity>>;
    async fn create(&self, insert_post_entity: InsertPostEntity) -> Result<PostEntity>;
    async fn delete(&self, post_id: Uuid) -> Result<bool>;
}
