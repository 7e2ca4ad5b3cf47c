/// HTTP handlers for blog endpoints
///
/// This module contains handlers for:
/// - Users: Create and read accounts
/// - Posts: Create, read, update, delete posts (deletion cascades to comments)
/// - Comments: Create comments and read comment trees
/// - Health: Liveness and readiness probes
///
/// Handlers expect a [`SharedStore`](crate::db::SharedStore) in app data.
use crate::error::AppError;
use actix_web::web;

pub mod comments;
pub mod health;
pub mod posts;
pub mod users;

// Re-export handler functions at module level
pub use comments::{create_comment, get_comment_tree, get_post_comments};
pub use health::{health_summary, liveness_check, readiness_summary};
pub use posts::{create_post, delete_post, get_post, update_post};
pub use users::{create_user, get_user};

/// Register the blog routes and JSON extractor settings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }))
    .route("/users/", web::post().to(create_user))
    .route("/users/{user_id}", web::get().to(get_user))
    .route("/posts/", web::post().to(create_post))
    .service(
        web::resource("/posts/{post_id}")
            .route(web::get().to(get_post))
            .route(web::put().to(update_post))
            .route(web::delete().to(delete_post)),
    )
    .route("/posts/{post_id}/comments", web::get().to(get_post_comments))
    .route("/comments/", web::post().to(create_comment))
    .route("/comments/{comment_id}", web::get().to(get_comment_tree));
}

