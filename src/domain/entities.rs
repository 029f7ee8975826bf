//! Domain entities mirrored from persistent storage.
//!
//! Identifiers are store-scoped: the local store assigns UUIDs while the
//! remote blog service assigns its own integer IDs. The slug is the only key
//! shared across stores, and even that match is best-effort since the remote
//! service may normalize slugs differently.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub author_name: String,
    pub content: String,
    pub category_slug: String,
    pub category_name: String,
    /// Relative media path for locally stored images (`blog/images/...`).
    pub image_reference: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_name: String,
    pub email: String,
    pub body: String,
    /// Moderation flag; only active comments are publicly visible.
    pub active: bool,
    pub created_at: OffsetDateTime,
}
