use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use subdesk_core::domain::{
    entities::posts::{InsertPostEntity, PostEntity},
    repositories::{posts::PostRepository, storage::MediaStorageClient},
    value_objects::{
        enums::roles::Role,
        posts::{
            DEFAULT_PAGE_LIMIT, ImageUpload, ListPostsQuery, MAX_CAPTION_CHARS, MAX_PAGE_LIMIT,
            Pagination, PostModel, PostPage,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::validation::{ValidationError, parse_object_id};
use crate::auth::authorizer::{ADMIN_ONLY, authorize};

#[derive(Debug, Error)]
pub enum PostError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Post not found")]
    PostNotFound,
    #[error("You can only delete your own posts")]
    NotOwner,
    #[error("File upload failed")]
    UploadFailed(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PostError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PostError::Validation(_) => StatusCode::BAD_REQUEST,
            PostError::PostNotFound => StatusCode::NOT_FOUND,
            PostError::NotOwner => StatusCode::FORBIDDEN,
            PostError::UploadFailed(_) | PostError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PostError::Validation(err) => err.code,
            PostError::PostNotFound => "POST_NOT_FOUND",
            PostError::NotOwner => "FORBIDDEN",
            PostError::UploadFailed(_) => "UPLOAD_FAILED",
            PostError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PostError>;

/// Parses a positive page/limit value; anything else yields `None`.
fn positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value > 0)
}

pub struct PostUseCase<R, M>
where
    R: PostRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    post_repository: Arc<R>,
    media_storage: Arc<M>,
}

impl<R, M> PostUseCase<R, M>
where
    R: PostRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    pub fn new(post_repository: Arc<R>, media_storage: Arc<M>) -> Self {
        Self {
            post_repository,
            media_storage,
        }
    }

    pub async fn list_posts(&self, query: ListPostsQuery) -> UseCaseResult<PostPage> {
        let page = positive(query.page.as_deref()).unwrap_or(1);
        let limit = positive(query.limit.as_deref())
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);
        let offset = (page - 1).saturating_mul(limit);

        let posts = self
            .post_repository
            .list_page(limit, offset)
            .await
            .map_err(|err| {
                error!(page, limit, db_error = ?err, "posts: failed to list posts");
                PostError::Internal(err)
            })?;
        let total_posts = self.post_repository.count().await.map_err(|err| {
            error!(db_error = ?err, "posts: failed to count posts");
            PostError::Internal(err)
        })?;

        Ok(PostPage {
            data: posts.into_iter().map(PostModel::from).collect(),
            pagination: Pagination::new(page, limit, total_posts),
        })
    }

    pub async fn get_post(&self, raw_post_id: &str) -> UseCaseResult<PostModel> {
        let post_id = parse_object_id(raw_post_id, "Post ID", "id")?;
        self.find_post(post_id).await.map(PostModel::from)
    }

    pub async fn create_post(
        &self,
        author_id: Uuid,
        image: Option<ImageUpload>,
        caption: Option<String>,
    ) -> UseCaseResult<PostModel> {
        let Some(image) = image.filter(|image| !image.bytes.is_empty()) else {
            return Err(ValidationError::missing(&["image"]).into());
        };

        if let Some(content_type) = image.content_type.as_deref() {
            if !content_type.starts_with("image/") {
                return Err(ValidationError::invalid("image", "image must be an image file").into());
            }
        }

        let caption = caption
            .map(|caption| caption.trim().to_string())
            .filter(|caption| !caption.is_empty());
        if caption
            .as_deref()
            .is_some_and(|caption| caption.chars().count() > MAX_CAPTION_CHARS)
        {
            return Err(ValidationError::invalid(
                "caption",
                format!("Caption cannot exceed {} characters", MAX_CAPTION_CHARS),
            )
            .into());
        }

        let file_name = image
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("post-{}.jpg", Utc::now().timestamp_millis()));

        let uploaded = self
            .media_storage
            .upload_image(image.bytes, &file_name, image.content_type)
            .await
            .map_err(|err| {
                error!(%author_id, error = ?err, "posts: image upload failed");
                PostError::UploadFailed(err)
            })?;

        let created = self
            .post_repository
            .create(InsertPostEntity {
                image: uploaded.url,
                caption,
                user_id: author_id,
            })
            .await;
        let post = match created {
            Ok(post) => post,
            Err(err) => {
                error!(%author_id, object_key = %uploaded.object_key, db_error = ?err, "posts: failed to insert post");
                self.discard_upload(&uploaded.object_key).await;
                return Err(PostError::Internal(err));
            }
        };

        info!(post_id = %post.id, %author_id, "posts: post created");
        Ok(PostModel::from(post))
    }

    /// Authors may delete their own posts; admins may delete any.
    pub async fn delete_post(
        &self,
        actor_id: Uuid,
        actor_role: Role,
        raw_post_id: &str,
    ) -> UseCaseResult<()> {
        let post_id = parse_object_id(raw_post_id, "Post ID", "id")?;
        let post = self.find_post(post_id).await?;

        if post.user_id != actor_id && authorize(actor_role, ADMIN_ONLY).is_err() {
            warn!(%post_id, %actor_id, "posts: delete denied for non-owner");
            return Err(PostError::NotOwner);
        }

        let deleted = self.post_repository.delete(post_id).await.map_err(|err| {
            error!(%post_id, db_error = ?err, "posts: failed to delete post");
            PostError::Internal(err)
        })?;
        if !deleted {
            return Err(PostError::PostNotFound);
        }

        info!(%post_id, %actor_id, "posts: post deleted");
        Ok(())
    }

    /// Removes an object whose post row never landed. Failures only leave an orphan behind.
    async fn discard_upload(&self, object_key: &str) {
        if let Err(err) = self.media_storage.delete_object(object_key).await {
            warn!(%object_key, error = ?err, "posts: failed to remove orphaned upload");
        }
    }

    async fn find_post(&self, post_id: Uuid) -> UseCaseResult<PostEntity> {
        self.post_repository
            .find_by_id(post_id)
            .await
            .map_err(|err| {
                error!(%post_id, db_error = ?err, "posts: failed to load post");
                PostError::Internal(err)
            })?
            .ok_or(PostError::PostNotFound)
    }
}
