/// Post handlers - HTTP endpoints for post operations
use crate::db::SharedStore;
use crate::error::Result;
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreatePostRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Create a new post
pub async fn create_post(
    store: web::Data<SharedStore>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = PostService::new(store.get_ref().clone());
    let post = service
        .create_post(req.user_id, &req.title, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Get a post by ID
pub async fn get_post(
    store: web::Data<SharedStore>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = PostService::new(store.get_ref().clone());
    let post = service.get_post(post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Replace a post's title and content
pub async fn update_post(
    store: web::Data<SharedStore>,
    post_id: web::Path<i64>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = PostService::new(store.get_ref().clone());
    let post = service
        .update_post(post_id.into_inner(), &req.title, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post and all of its comments; responds with the deleted post
pub async fn delete_post(
    store: web::Data<SharedStore>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = PostService::new(store.get_ref().clone());
    let post = service.delete_post(post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(post))
}
