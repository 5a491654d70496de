use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::posts::PostEntity;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const MAX_CAPTION_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostModel {
    pub id: Uuid,
    pub image: String,
    pub caption: Option<String>,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostEntity> for PostModel {
    fn from(value: PostEntity) -> Self {
        Self {
            id: value.id,
            image: value.image,
            caption: value.caption,
            user: value.user_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Raw query values; unparsable numbers fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub total_posts: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(current_page: i64, limit: i64, total_posts: i64) -> Self {
        let total_pages = (total_posts + limit - 1) / limit;
        Self {
            current_page,
            total_pages,
            limit,
            total_posts,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostPage {
    pub data: Vec<PostModel>,
    pub pagination: Pagination,
}

/// An image received from a client, before upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}
