/// Post service - handles post creation, retrieval, updates and cascading deletion
use crate::db::SharedStore;
use crate::error::{AppError, Result};
use crate::metrics::CASCADE_DELETED_COMMENTS;
use crate::models::{NewPost, Post};

pub struct PostService {
    store: SharedStore,
}

impl PostService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a new post
    pub async fn create_post(&self, user_id: i64, title: &str, content: &str) -> Result<Post> {
        let mut tx = self.store.begin().await?;
        let post = tx
            .insert_post(NewPost {
                user_id,
                title: title.to_string(),
                content: content.to_string(),
            })
            .await?;
        tx.commit().await?;

        tracing::info!(post_id = post.id, user_id, "post created");
        Ok(post)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        let mut tx = self.store.begin_snapshot().await?;
        let post = tx
            .find_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;
        tx.commit().await?;

        Ok(post)
    }

    /// Overwrite title and content. Ownership and `created_at` are untouched.
    pub async fn update_post(&self, post_id: i64, title: &str, content: &str) -> Result<Post> {
        let mut tx = self.store.begin().await?;
        let post = tx
            .update_post(post_id, title, content)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;
        tx.commit().await?;

        tracing::info!(post_id, "post updated");
        Ok(post)
    }

    /// Delete a post and every comment attached to it, at any depth.
    ///
    /// The comment scan is by post, not by reply chain, so one pass reaches
    /// all nesting levels. Everything happens in one transaction. Returns the
    /// post as it was before deletion.
    pub async fn delete_post(&self, post_id: i64) -> Result<Post> {
        let mut tx = self.store.begin().await?;

        let post = tx
            .find_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;

        let comments = tx.find_comments_by_post(post_id).await?;
        // Newest first: replies are always created after their parent.
        for comment in comments.iter().rev() {
            tx.delete_comment(comment.id).await?;
        }

        if !tx.delete_post(post_id).await? {
            return Err(post_not_found(post_id));
        }

        tx.commit().await?;

        CASCADE_DELETED_COMMENTS.inc_by(comments.len() as u64);
        tracing::info!(
            post_id,
            deleted_comments = comments.len(),
            "post deleted"
        );

        Ok(post)
    }
}

fn post_not_found(post_id: i64) -> AppError {
    AppError::NotFound(format!("post {}", post_id))
}
