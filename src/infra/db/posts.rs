use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use sqlx::{FromRow, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, PostQueryFilter, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const POST_SELECT: &str = "SELECT p.id, p.slug, p.title, p.author_name, p.content, \
     p.image_reference, c.slug AS category_slug, c.name AS category_name, p.created_at \
     FROM posts p INNER JOIN categories c ON c.id = p.category_id";

const POST_SELECT_BY_SLUG_ORDER: &str = "SELECT p.id, p.slug, p.title, p.author_name, \
     p.content, p.image_reference, c.slug AS category_slug, c.name AS category_name, \
     p.created_at FROM posts p INNER JOIN categories c ON c.id = p.category_id \
     ORDER BY p.slug";

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    slug: String,
    title: String,
    author_name: String,
    content: String,
    image_reference: Option<String>,
    category_slug: String,
    category_name: String,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            author_name: row.author_name,
            content: row.content,
            category_slug: row.category_slug,
            category_name: row.category_name,
            image_reference: row.image_reference,
            created_at: row.created_at,
        }
    }
}

fn apply_feed_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q PostQueryFilter) {
    if let Some(category) = filter.category.as_ref() {
        qb.push(" AND (c.slug = ");
        qb.push_bind(category);
        qb.push(" OR c.name ILIKE ");
        qb.push_bind(category);
        qb.push(")");
    }

    if let Some(search) = filter.search.as_ref() {
        let pattern = format!("%{search}%");
        qb.push(" AND (p.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.content ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.author_name ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

impl PostgresRepositories {
    async fn fetch_post(&self, id: Uuid) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.into())
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(&self, filter: &PostQueryFilter) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::new(POST_SELECT);
        qb.push(" WHERE 1=1 ");
        apply_feed_filter(&mut qb, filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC");

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} ORDER BY p.created_at DESC, p.id DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.slug = $1"))
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1)")
                .bind(slug)
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        Ok(exists)
    }

    async fn count_posts(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        count
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }

    fn stream_all(&self) -> BoxStream<'_, Result<PostRecord, RepoError>> {
        let stream = sqlx::query_as::<_, PostRow>(POST_SELECT_BY_SLUG_ORDER)
            .fetch(self.pool())
            .map(|row| match row {
                Ok(row) => Ok(PostRecord::from(row)),
                Err(err) => Err(map_sqlx_error(err)),
            });

        Box::pin(stream)
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO posts (id, slug, title, author_name, content, category_id, image_reference) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(&params.slug)
        .bind(&params.title)
        .bind(&params.author_name)
        .bind(&params.content)
        .bind(params.category_id)
        .bind(&params.image_reference)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.fetch_post(id).await
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let result = sqlx::query(
            "UPDATE posts SET title = $2, author_name = $3, content = $4, \
             category_id = $5, image_reference = $6 WHERE id = $1",
        )
        .bind(params.id)
        .bind(&params.title)
        .bind(&params.author_name)
        .bind(&params.content)
        .bind(params.category_id)
        .bind(&params.image_reference)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.fetch_post(params.id).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
