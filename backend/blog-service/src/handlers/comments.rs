/// Comment handlers - HTTP endpoints for comment operations
use crate::db::SharedStore;
use crate::error::Result;
use crate::models::CommentTree;
use crate::services::CommentService;
use actix_web::{http::header::ContentType, web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for creating a comment. `parent_id` of `0` or `null` creates
/// a top-level comment.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub user_id: i64,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Create a new comment
pub async fn create_comment(
    store: web::Data<SharedStore>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = CommentService::new(store.get_ref().clone());
    let comment = service
        .create_comment(req.post_id, req.user_id, &req.content, req.parent_id)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Get a comment with all nested replies
///
/// Encoded with [`CommentTree::to_json_vec`], which handles reply chains of any depth.
pub async fn get_comment_tree(
    store: web::Data<SharedStore>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = CommentService::new(store.get_ref().clone());
    let tree = service.get_comment_tree(comment_id.into_inner()).await?;
    let body = tree.to_json_vec()?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

/// Get every top-level comment tree of a post
pub async fn get_post_comments(
    store: web::Data<SharedStore>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = CommentService::new(store.get_ref().clone());
    let trees = service.get_top_level_trees(post_id.into_inner()).await?;
    let body = CommentTree::list_to_json_vec(&trees)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}
