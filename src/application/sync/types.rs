//! Tagged outcomes for the synchronization surface.

use serde::Serialize;

use crate::application::pagination::Page;
use crate::application::query::PostView;
use crate::application::remote::ImageAttachment;
use crate::domain::entities::{CommentRecord, PostRecord, TagRecord};

/// Whether the remote mirror kept up with a local write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Remote mirror confirmed the write (or had nothing to do).
    Mirrored,
    /// Local write succeeded, remote mirror did not. Partial success.
    SyncFailed,
}

/// Which store actually served a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Remote,
    Local,
}

/// Input for a post creation.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    pub slug: Option<String>,
    pub author_name: String,
    pub content: String,
    /// Category slug; must name an existing category.
    pub category: String,
    pub tags: Vec<String>,
    pub image: Option<ImageAttachment>,
}

/// Input for a post update. The slug is the lookup key and does not change.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub author_name: String,
    pub content: String,
    pub category: String,
    pub tags: Option<Vec<String>>,
    pub image: Option<ImageAttachment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostReceipt {
    pub post: PostRecord,
    pub sync: SyncStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteReceipt {
    pub slug: String,
    pub sync: SyncStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostFeed {
    #[serde(flatten)]
    pub page: Page<PostView>,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub related: Vec<PostView>,
    /// Approved comments for the local counterpart, when one exists.
    pub comments: Vec<CommentRecord>,
    pub tags: Vec<TagRecord>,
    pub source: ContentSource,
}

/// Aggregate outcome of a best-effort resync sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResyncReport {
    pub attempted: u64,
    pub mirrored: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub local_posts: u64,
    pub categories: u64,
    pub comments: u64,
    /// Absent when the remote service could not be reached.
    pub remote_posts: Option<u64>,
}
