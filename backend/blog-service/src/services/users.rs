/// User service - account creation and lookup
use crate::db::SharedStore;
use crate::error::{AppError, Result};
use crate::models::{NewUser, User};
use crate::security::hash_password;

pub struct UserService {
    store: SharedStore,
}

impl UserService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Register a user. Duplicate usernames or emails surface as
    /// `ConstraintViolation` from the store.
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))??;

        let mut tx = self.store.begin().await?;
        let user = tx
            .insert_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        let mut tx = self.store.begin_snapshot().await?;
        let user = tx
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;
        tx.commit().await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRecordStore;
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    use std::sync::Arc;

    #[tokio::test]
    async fn created_user_stores_a_verifiable_hash() {
        let service = UserService::new(Arc::new(MemoryRecordStore::new()));
        let user = service
            .create_user("ada", "ada@example.com", "analytical-engine")
            .await
            .unwrap();

        let fetched = service.get_user(user.id).await.unwrap();
        assert_eq!(fetched.username, "ada");
        assert_ne!(fetched.password_hash, "analytical-engine");
        let parsed = PasswordHash::new(&fetched.password_hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"analytical-engine", &parsed)
            .is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let service = UserService::new(Arc::new(MemoryRecordStore::new()));
        service
            .create_user("ada", "ada@example.com", "analytical-engine")
            .await
            .unwrap();

        let err = service
            .create_user("lovelace", "ada@example.com", "difference-engine")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let service = UserService::new(Arc::new(MemoryRecordStore::new()));
        assert!(matches!(
            service.get_user(5).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
