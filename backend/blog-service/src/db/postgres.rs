use crate::db::{RecordStore, StoreTx};
use crate::error::Result;
use crate::models::{Comment, NewComment, NewPost, NewUser, Post, User};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

/// Record store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Apply the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn begin_snapshot(&self) -> Result<Box<dyn StoreTx>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// One PostgreSQL transaction. sqlx rolls it back on drop unless committed.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn insert_user(&mut self, user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(user)
    }

    async fn find_user(&mut self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(user)
    }

    async fn insert_post(&mut self, post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(post.user_id)
        .bind(post.title)
        .bind(post.content)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(post)
    }

    async fn find_post(&mut self, post_id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(post)
    }

    async fn update_post(
        &mut self,
        post_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2, content = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(title)
        .bind(content)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(post)
    }

    async fn delete_post(&mut self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&mut self, comment: NewComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, user_id, parent_id, content, created_at, updated_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(comment.parent_id)
        .bind(comment.content)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(comment)
    }

    async fn find_comment(&mut self, comment_id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, parent_id, content, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(comment)
    }

    async fn find_replies(&mut self, parent_id: i64) -> Result<Vec<Comment>> {
        let replies = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, parent_id, content, created_at, updated_at
            FROM comments
            WHERE parent_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(replies)
    }

    async fn find_top_level_comments(&mut self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, parent_id, content, created_at, updated_at
            FROM comments
            WHERE post_id = $1 AND parent_id IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(comments)
    }

    async fn find_comments_by_post(&mut self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, parent_id, content, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(comments)
    }

    async fn delete_comment(&mut self, comment_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PgTx { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
