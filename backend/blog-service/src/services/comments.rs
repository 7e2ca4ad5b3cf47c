/// Comment service - handles comment creation and tree-shaped reads
use crate::db::SharedStore;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentTree, NewComment};
use crate::services::tree::build_tree;

pub struct CommentService {
    store: SharedStore,
}

impl CommentService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a comment, optionally as a reply.
    ///
    /// A `parent_id` of `0` is treated as no parent. A parent must exist and
    /// belong to the same post; the author is checked by the store.
    pub async fn create_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment> {
        let parent_id = parent_id.filter(|id| *id != 0);

        let mut tx = self.store.begin().await?;

        if tx.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        if let Some(parent_id) = parent_id {
            let parent = tx
                .find_comment(parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("comment {}", parent_id)))?;

            if parent.post_id != post_id {
                return Err(AppError::ConstraintViolation(format!(
                    "parent comment {} belongs to post {}, not post {}",
                    parent_id, parent.post_id, post_id
                )));
            }
        }

        let comment = tx
            .insert_comment(NewComment {
                post_id,
                user_id,
                parent_id,
                content: content.to_string(),
            })
            .await?;

        tx.commit().await?;

        tracing::info!(
            comment_id = comment.id,
            post_id,
            parent_id = ?comment.parent_id,
            "comment created"
        );

        Ok(comment)
    }

    /// Get a comment with all of its nested replies
    pub async fn get_comment_tree(&self, comment_id: i64) -> Result<CommentTree> {
        let mut tx = self.store.begin_snapshot().await?;

        let comment = tx
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))?;

        let tree = build_tree(tx.as_mut(), comment).await?;
        tx.commit().await?;

        Ok(tree)
    }

    /// Get every top-level comment of a post as a tree, in fetch order.
    ///
    /// A post without comments, or an unknown post, yields an empty list.
    pub async fn get_top_level_trees(&self, post_id: i64) -> Result<Vec<CommentTree>> {
        let mut tx = self.store.begin_snapshot().await?;

        let roots = tx.find_top_level_comments(post_id).await?;
        let mut trees = Vec::with_capacity(roots.len());
        for root in roots {
            trees.push(build_tree(tx.as_mut(), root).await?);
        }

        tx.commit().await?;

        Ok(trees)
    }
}
