/// Database access layer
///
/// This module provides:
/// - The record store traits the lifecycle services run against
/// - A PostgreSQL implementation backed by a sqlx pool
/// - An in-memory implementation with the same constraint rules
/// - Connection pool configuration
///
/// Every lifecycle operation opens one transaction with [`RecordStore::begin`]
/// or [`RecordStore::begin_snapshot`] and finishes with [`StoreTx::commit`].
/// Dropping a transaction without committing discards its writes.
use crate::error::Result;
use crate::models::{Comment, NewComment, NewPost, NewUser, Post, User};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use pool::{create_pool, DbConfig};
pub use postgres::PgRecordStore;

/// Store handle shared across workers.
pub type SharedStore = Arc<dyn RecordStore>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Open a read-write transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTx>>;

    /// Open a read-only transaction that sees a single snapshot for its whole
    /// lifetime. Used for multi-query tree reads.
    async fn begin_snapshot(&self) -> Result<Box<dyn StoreTx>>;

    /// Cheap round-trip used by readiness checks.
    async fn ping(&self) -> Result<()>;
}

/// Operations available inside one transaction.
#[async_trait]
pub trait StoreTx: Send {
    async fn insert_user(&mut self, user: NewUser) -> Result<User>;

    async fn find_user(&mut self, user_id: i64) -> Result<Option<User>>;

    async fn insert_post(&mut self, post: NewPost) -> Result<Post>;

    async fn find_post(&mut self, post_id: i64) -> Result<Option<Post>>;

    /// Overwrite title and content and refresh `updated_at`.
    async fn update_post(
        &mut self,
        post_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>>;

    async fn delete_post(&mut self, post_id: i64) -> Result<bool>;

    async fn insert_comment(&mut self, comment: NewComment) -> Result<Comment>;

    async fn find_comment(&mut self, comment_id: i64) -> Result<Option<Comment>>;

    /// Direct replies of a comment, in insertion order.
    async fn find_replies(&mut self, parent_id: i64) -> Result<Vec<Comment>>;

    /// Comments of a post with no parent, in insertion order.
    async fn find_top_level_comments(&mut self, post_id: i64) -> Result<Vec<Comment>>;

    /// Every comment of a post at any depth, in insertion order.
    async fn find_comments_by_post(&mut self, post_id: i64) -> Result<Vec<Comment>>;

    async fn delete_comment(&mut self, comment_id: i64) -> Result<bool>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
