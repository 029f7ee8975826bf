use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CommentsRepo, CreateCommentParams, RepoError};
use crate::domain::entities::CommentRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(Debug, FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_name: String,
    email: String,
    body: String,
    active: bool,
    created_at: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author_name: row.author_name,
            email: row.email,
            body: row.body,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CommentsRepo for PostgresRepositories {
    async fn insert_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let row = sqlx::query_as::<_, CommentRow>(
            "INSERT INTO comments (id, post_id, author_name, email, body, active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, post_id, author_name, email, body, active, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(params.post_id)
        .bind(&params.author_name)
        .bind(&params.email)
        .bind(&params.body)
        .bind(params.active)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, post_id, author_name, email, body, active, created_at \
             FROM comments WHERE post_id = $1 AND active ORDER BY created_at",
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn count_comments(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        count
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}
