/// User handlers - account creation and lookup
use crate::db::SharedStore;
use crate::error::Result;
use crate::services::UserService;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Register a user
pub async fn create_user(
    store: web::Data<SharedStore>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = UserService::new(store.get_ref().clone());
    let user = service
        .create_user(&req.username, &req.email, &req.password)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Get a user by ID
pub async fn get_user(
    store: web::Data<SharedStore>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = UserService::new(store.get_ref().clone());
    let user = service.get_user(user_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(user))
}
