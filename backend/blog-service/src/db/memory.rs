//! In-process record store.
//!
//! Write transactions hold the table write lock for their whole lifetime and
//! stage changes on a private copy, which is published only by `commit`.
//! Snapshot transactions share the read lock and read the tables in place, so
//! tree reads run concurrently with each other but never alongside a writer.
//! Constraint rules match the PostgreSQL schema: foreign keys on `user_id` and
//! `post_id` are checked immediately, the comment parent key is checked at
//! commit.

use crate::db::{RecordStore, StoreTx};
use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment, NewPost, NewUser, Post, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

impl Tables {
    fn check_parent_keys(&self) -> Result<()> {
        for comment in self.comments.values() {
            if let Some(parent_id) = comment.parent_id {
                if !self.comments.contains_key(&parent_id) {
                    return Err(AppError::ConstraintViolation(format!(
                        "comment {} references missing parent comment {}",
                        comment.id, parent_id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites a parent link behind the constraint checks so tests can
    /// reproduce corrupted reply chains.
    #[cfg(test)]
    pub(crate) async fn force_parent(&self, comment_id: i64, parent_id: Option<i64>) {
        let mut tables = self.tables.write().await;
        if let Some(comment) = tables.comments.get_mut(&comment_id) {
            comment.parent_id = parent_id;
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let guard = self.tables.clone().write_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx {
            access: Access::Write { guard, staged },
        }))
    }

    async fn begin_snapshot(&self) -> Result<Box<dyn StoreTx>> {
        let guard = self.tables.clone().read_owned().await;
        Ok(Box::new(MemoryTx {
            access: Access::Snapshot(guard),
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

enum Access {
    Snapshot(OwnedRwLockReadGuard<Tables>),
    Write {
        guard: OwnedRwLockWriteGuard<Tables>,
        staged: Tables,
    },
}

struct MemoryTx {
    access: Access,
}

impl MemoryTx {
    fn tables(&self) -> &Tables {
        match &self.access {
            Access::Snapshot(guard) => &**guard,
            Access::Write { staged, .. } => staged,
        }
    }

    fn tables_mut(&mut self) -> Result<&mut Tables> {
        match &mut self.access {
            Access::Snapshot(_) => Err(AppError::Internal(
                "cannot write in a read-only transaction".to_string(),
            )),
            Access::Write { staged, .. } => Ok(staged),
        }
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn insert_user(&mut self, user: NewUser) -> Result<User> {
        let tables = self.tables_mut()?;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::ConstraintViolation(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::ConstraintViolation(format!(
                "email '{}' already exists",
                user.email
            )));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&mut self, user_id: i64) -> Result<Option<User>> {
        Ok(self.tables().users.get(&user_id).cloned())
    }

    async fn insert_post(&mut self, post: NewPost) -> Result<Post> {
        let tables = self.tables_mut()?;
        if !tables.users.contains_key(&post.user_id) {
            return Err(AppError::ConstraintViolation(format!(
                "post references missing user {}",
                post.user_id
            )));
        }

        tables.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: tables.last_post_id,
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&mut self, post_id: i64) -> Result<Option<Post>> {
        Ok(self.tables().posts.get(&post_id).cloned())
    }

    async fn update_post(
        &mut self,
        post_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>> {
        let Some(post) = self.tables_mut()?.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        post.title = title.to_string();
        post.content = content.to_string();
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&mut self, post_id: i64) -> Result<bool> {
        let tables = self.tables_mut()?;
        if tables.comments.values().any(|c| c.post_id == post_id) {
            return Err(AppError::ConstraintViolation(format!(
                "post {} is still referenced by comments",
                post_id
            )));
        }
        Ok(tables.posts.remove(&post_id).is_some())
    }

    async fn insert_comment(&mut self, comment: NewComment) -> Result<Comment> {
        let tables = self.tables_mut()?;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(AppError::ConstraintViolation(format!(
                "comment references missing post {}",
                comment.post_id
            )));
        }
        if !tables.users.contains_key(&comment.user_id) {
            return Err(AppError::ConstraintViolation(format!(
                "comment references missing user {}",
                comment.user_id
            )));
        }

        tables.last_comment_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: tables.last_comment_id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            parent_id: comment.parent_id,
            content: comment.content,
            created_at: now,
            updated_at: now,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&mut self, comment_id: i64) -> Result<Option<Comment>> {
        Ok(self.tables().comments.get(&comment_id).cloned())
    }

    async fn find_replies(&mut self, parent_id: i64) -> Result<Vec<Comment>> {
        Ok(self
            .tables()
            .comments
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn find_top_level_comments(&mut self, post_id: i64) -> Result<Vec<Comment>> {
        Ok(self
            .tables()
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.parent_id.is_none())
            .cloned()
            .collect())
    }

    async fn find_comments_by_post(&mut self, post_id: i64) -> Result<Vec<Comment>> {
        Ok(self
            .tables()
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn delete_comment(&mut self, comment_id: i64) -> Result<bool> {
        Ok(self.tables_mut()?.comments.remove(&comment_id).is_some())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        match self.access {
            Access::Snapshot(_) => Ok(()),
            Access::Write { mut guard, staged } => {
                staged.check_parent_keys()?;
                *guard = staged;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(tx: &mut Box<dyn StoreTx>, name: &str) -> User {
        tx.insert_user(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() {
        let store = MemoryRecordStore::new();

        {
            let mut tx = store.begin().await.unwrap();
            seed_user(&mut tx, "ghost").await;
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_user(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn committed_writes_are_visible_to_later_transactions() {
        let store = MemoryRecordStore::new();

        let mut tx = store.begin().await.unwrap();
        let user = seed_user(&mut tx, "ada").await;
        tx.commit().await.unwrap();

        let mut tx = store.begin_snapshot().await.unwrap();
        assert_eq!(tx.find_user(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_constraint_violation() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin().await.unwrap();
        seed_user(&mut tx, "ada").await;

        let err = tx
            .insert_user(NewUser {
                username: "ada".into(),
                email: "other@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn post_requires_existing_user() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin().await.unwrap();

        let err = tx
            .insert_post(NewPost {
                user_id: 42,
                title: "t".into(),
                content: "c".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn dangling_parent_is_rejected_at_commit() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = seed_user(&mut tx, "ada").await;
        let post = tx
            .insert_post(NewPost {
                user_id: user.id,
                title: "t".into(),
                content: "c".into(),
            })
            .await
            .unwrap();
        tx.insert_comment(NewComment {
            post_id: post.id,
            user_id: user.id,
            parent_id: Some(99),
            content: "orphan".into(),
        })
        .await
        .unwrap();

        let err = tx.commit().await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_post(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn post_with_comments_cannot_be_deleted_directly() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = seed_user(&mut tx, "ada").await;
        let post = tx
            .insert_post(NewPost {
                user_id: user.id,
                title: "t".into(),
                content: "c".into(),
            })
            .await
            .unwrap();
        tx.insert_comment(NewComment {
            post_id: post.id,
            user_id: user.id,
            parent_id: None,
            content: "hi".into(),
        })
        .await
        .unwrap();

        let err = tx.delete_post(post.id).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn snapshots_share_the_read_lock() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = seed_user(&mut tx, "ada").await;
        tx.commit().await.unwrap();

        let mut first = store.begin_snapshot().await.unwrap();
        let mut second = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            store.begin_snapshot(),
        )
        .await
        .expect("second snapshot waited on the first")
        .unwrap();

        assert_eq!(first.find_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(second.find_user(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn snapshot_rejects_writes() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin_snapshot().await.unwrap();

        let err = tx
            .insert_user(NewUser {
                username: "ada".into(),
                email: "ada@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_user(1).await.unwrap().is_none());
    }
}
