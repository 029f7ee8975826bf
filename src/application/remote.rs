//! Seam for the remote blog service: wire types, error taxonomy, and the
//! client trait the synchronization layer depends on.
//!
//! Every client operation is a single attempt with a fixed timeout. Failures
//! are explicit values, never panics; the synchronization layer decides how a
//! failure degrades the user-visible outcome.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Timeout, connection refused, DNS failure. Absorbed at the client
    /// boundary and logged with context.
    #[error("transport failure talking to the remote blog service: {0}")]
    Transport(String),
    /// Non-2xx response. Caller-visible semantics match `Transport`; the
    /// status is preserved for logging.
    #[error("remote blog service rejected the request with status {status}")]
    Rejected { status: u16 },
    /// Body that could not be decoded into the expected shape.
    #[error("remote blog service returned an undecodable body: {0}")]
    Malformed(String),
}

/// A post as the remote service serializes it. Field spellings follow the
/// remote wire format; absent fields decode to their defaults so a sparse
/// deployment still lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBlogRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "Author_name")]
    pub author_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "Category")]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Form fields for remote create/update calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePostFields {
    pub title: String,
    pub slug: String,
    pub author_name: String,
    pub content: String,
    pub category: String,
}

impl RemotePostFields {
    /// Pairs in the remote service's expected form-key spelling.
    pub fn as_form_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("slug", self.slug.clone()),
            ("Author_name", self.author_name.clone()),
            ("content", self.content.clone()),
            ("Category", self.category.clone()),
        ]
    }
}

/// An uploaded image forwarded to the remote service as a multipart part.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[async_trait]
pub trait RemoteBlogApi: Send + Sync {
    async fn create(
        &self,
        fields: &RemotePostFields,
        image: Option<&ImageAttachment>,
    ) -> Result<(), RemoteError>;

    async fn list(&self) -> Result<Vec<RemoteBlogRecord>, RemoteError>;

    /// Direct slug lookup with a mandatory fallback: deployments without the
    /// slug endpoint are served by scanning `list()`.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<RemoteBlogRecord>, RemoteError>;

    async fn update(
        &self,
        id: i64,
        fields: &RemotePostFields,
        image: Option<&ImageAttachment>,
    ) -> Result<(), RemoteError>;

    async fn delete(&self, id: i64) -> Result<(), RemoteError>;

    /// Auxiliary stat lookup; runs on the shorter timeout.
    async fn count(&self) -> Result<u64, RemoteError>;
}
