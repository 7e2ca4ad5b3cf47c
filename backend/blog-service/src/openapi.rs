/// OpenAPI document for the Blog Service
use actix_web::HttpResponse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog Service API",
        version = "1.0.0",
        description = "Users, posts and threaded comments. Comment reads return a comment with all of its nested replies; deleting a post deletes every comment on it.",
        license(
            name = "MIT"
        )
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "users", description = "Account creation and lookup"),
        (name = "posts", description = "Post creation, retrieval, updates, and cascading deletion"),
        (name = "comments", description = "Comment creation and comment tree reads"),
    ),
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}

pub async fn openapi_json() -> actix_web::Result<HttpResponse> {
    let body = ApiDoc::openapi().to_json().map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}
