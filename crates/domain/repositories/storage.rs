use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::storage::UploadedMedia;

#[automock]
#[async_trait]
pub trait MediaStorageClient {
    async fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: Option<String>,
    ) -> Result<UploadedMedia>;

    async fn delete_object(&self, object_key: &str) -> Result<()>;
}
