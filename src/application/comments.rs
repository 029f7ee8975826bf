//! Reader comments: intake and public listing.
//!
//! Comments are local-only; they are never mirrored to the remote service.

use std::sync::Arc;

use crate::application::error::ServiceError;
use crate::application::repos::{CommentsRepo, CreateCommentParams, PostsRepo};
use crate::domain::entities::CommentRecord;

/// New comments are held for moderation until an operator approves them.
const DEFAULT_ACTIVE: bool = false;

#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_name: String,
    pub email: String,
    pub body: String,
}

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostsRepo>, comments: Arc<dyn CommentsRepo>) -> Self {
        Self { posts, comments }
    }

    pub async fn add_comment(
        &self,
        post_slug: &str,
        comment: NewComment,
    ) -> Result<CommentRecord, ServiceError> {
        if comment.body.trim().is_empty() {
            return Err(ServiceError::validation("comment body must not be empty"));
        }

        let post = self
            .posts
            .find_by_slug(post_slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;

        let record = self
            .comments
            .insert_comment(CreateCommentParams {
                post_id: post.id,
                author_name: comment.author_name,
                email: comment.email,
                body: comment.body,
                active: DEFAULT_ACTIVE,
            })
            .await?;

        Ok(record)
    }

    /// Approved comments for a post, oldest first.
    pub async fn list_comments(&self, post_slug: &str) -> Result<Vec<CommentRecord>, ServiceError> {
        let post = self
            .posts
            .find_by_slug(post_slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;

        Ok(self.comments.list_active_for_post(post.id).await?)
    }
}
