//! Request models for the delivery layer. Responses reuse the application
//! layer's serializable outcome types directly.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PostListQuery {
    pub category: Option<String>,
    /// Free-text search over title, content, and author.
    pub q: Option<String>,
    /// Raw page parameter; invalid values resolve to page 1.
    pub page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentCreateRequest {
    pub author_name: String,
    pub email: String,
    pub body: String,
}
