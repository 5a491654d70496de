use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::users::{InsertUserEntity, UserEntity};

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    /// `email` must already be normalized (trimmed, lower-case).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    async fn create(&self, insert_user_entity: InsertUserEntity) -> Result<UserEntity>;
}
