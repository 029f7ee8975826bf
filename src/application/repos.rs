//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{CategoryRecord, CommentRecord, PostRecord, TagRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Filters applied to post listings, whichever store serves them.
#[derive(Debug, Clone, Default)]
pub struct PostQueryFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl PostQueryFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.search.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub slug: String,
    pub title: String,
    pub author_name: String,
    pub content: String,
    pub category_id: Uuid,
    pub image_reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub title: String,
    pub author_name: String,
    pub content: String,
    pub category_id: Uuid,
    pub image_reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: Uuid,
    pub author_name: String,
    pub email: String,
    pub body: String,
    pub active: bool,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// List posts matching the filter in reverse creation order.
    async fn list_posts(&self, filter: &PostQueryFilter) -> Result<Vec<PostRecord>, RepoError>;

    async fn list_recent(&self, limit: u32) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    async fn count_posts(&self) -> Result<u64, RepoError>;

    /// Stream every stored post; used by the bulk resync sweep.
    fn stream_all(&self) -> BoxStream<'_, Result<PostRecord, RepoError>>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError>;

    async fn count_categories(&self) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<TagRecord>, RepoError>;

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError>;
}

#[async_trait]
pub trait TagsWriteRepo: Send + Sync {
    /// Find a tag by slug or create it with the given display name.
    async fn ensure_tag(&self, slug: &str, name: &str) -> Result<TagRecord, RepoError>;

    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn insert_comment(&self, params: CreateCommentParams) -> Result<CommentRecord, RepoError>;

    /// Comments visible to readers: `active = true`, oldest first.
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError>;

    async fn count_comments(&self) -> Result<u64, RepoError>;
}
