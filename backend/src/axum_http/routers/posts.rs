use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::QueryRejection,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use subdesk_core::domain::{
    repositories::{posts::PostRepository, storage::MediaStorageClient},
    value_objects::posts::{ImageUpload, ListPostsQuery},
};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::posts::PostUseCase,
};

pub fn routes<R, M>(post_usecase: Arc<PostUseCase<R, M>>) -> Router
where
    R: PostRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_posts::<R, M>).post(create_post::<R, M>))
        .route("/:id", get(get_post::<R, M>).delete(delete_post::<R, M>))
        .with_state(post_usecase)
}

pub async fn list_posts<R, M>(
    State(post_usecase): State<Arc<PostUseCase<R, M>>>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: PostRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    let Query(query) = query?;
    let page = post_usecase.list_posts(query).await?;

    Ok(Json(json!({
        "ok": true,
        "data": page.data,
        "pagination": page.pagination,
    })))
}

pub async fn get_post<R, M>(
    State(post_usecase): State<Arc<PostUseCase<R, M>>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    R: PostRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    let post = post_usecase.get_post(&post_id).await?;
    Ok(Json(json!({ "ok": true, "post": post })))
}

pub async fn create_post<R, M>(
    State(post_usecase): State<Arc<PostUseCase<R, M>>>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: PostRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    let (image, caption) = read_post_form(multipart?).await?;
    let post = post_usecase
        .create_post(auth.user_id, image, caption)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "message": "Post created successfully",
            "post": post,
        })),
    ))
}

pub async fn delete_post<R, M>(
    State(post_usecase): State<Arc<PostUseCase<R, M>>>,
    auth: AuthUser,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    R: PostRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    post_usecase
        .delete_post(auth.user_id, auth.role, &post_id)
        .await?;

    Ok(Json(json!({ "ok": true, "message": "Post deleted successfully" })))
}

/// Pulls the `image` file and optional `caption` out of a multipart body.
async fn read_post_form(
    mut multipart: Multipart,
) -> Result<(Option<ImageUpload>, Option<String>), AppError> {
    let mut image = None;
    let mut caption = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                image = Some(ImageUpload {
                    bytes: bytes.to_vec(),
                    file_name,
                    content_type,
                });
            }
            Some("caption") => caption = Some(field.text().await?),
            _ => {}
        }
    }

    Ok((image, caption))
}
