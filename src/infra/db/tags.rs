use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, TagsRepo, TagsWriteRepo};
use crate::domain::entities::TagRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(Debug, FromRow)]
struct TagRow {
    id: Uuid,
    slug: String,
    name: String,
    created_at: OffsetDateTime,
}

impl From<TagRow> for TagRecord {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl TagsRepo for PostgresRepositories {
    async fn list_all(&self) -> Result<Vec<TagRecord>, RepoError> {
        let rows =
            sqlx::query_as::<_, TagRow>("SELECT id, slug, name, created_at FROM tags ORDER BY name")
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT t.id, t.slug, t.name, t.created_at FROM tags t \
             INNER JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = $1 ORDER BY t.name",
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(TagRecord::from).collect())
    }
}

#[async_trait]
impl TagsWriteRepo for PostgresRepositories {
    async fn ensure_tag(&self, slug: &str, name: &str) -> Result<TagRecord, RepoError> {
        // Upsert keyed on the slug; an existing tag keeps its display name.
        let row = sqlx::query_as::<_, TagRow>(
            "INSERT INTO tags (id, slug, name) VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug \
             RETURNING id, slug, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(name)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}
