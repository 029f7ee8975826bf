#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use time::OffsetDateTime;
use uuid::Uuid;

use foglio::application::remote::{
    ImageAttachment, RemoteBlogApi, RemoteBlogRecord, RemoteError, RemotePostFields,
};
use foglio::application::repos::{
    CategoriesRepo, CommentsRepo, CreateCommentParams, CreatePostParams, PostQueryFilter,
    PostsRepo, PostsWriteRepo, RepoError, TagsRepo, TagsWriteRepo, UpdatePostParams,
};
use foglio::domain::entities::{CategoryRecord, CommentRecord, PostRecord, TagRecord};

/// In-memory stand-in for the Postgres repositories, mirroring their
/// filtering and ordering semantics closely enough for policy tests.
#[derive(Default)]
pub struct InMemoryRepositories {
    posts: Mutex<Vec<PostRecord>>,
    categories: Mutex<Vec<CategoryRecord>>,
    tags: Mutex<Vec<TagRecord>>,
    post_tags: Mutex<Vec<(Uuid, Uuid)>>,
    comments: Mutex<Vec<CommentRecord>>,
}

impl InMemoryRepositories {
    pub fn seed_category(&self, slug: &str, name: &str) -> CategoryRecord {
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: name.to_string(),
            description: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.categories.lock().unwrap().push(record.clone());
        record
    }

    pub fn seed_post(&self, slug: &str, title: &str, category: &CategoryRecord) -> PostRecord {
        let record = PostRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            author_name: "Nadia".to_string(),
            content: format!("body of {title}"),
            category_slug: category.slug.clone(),
            category_name: category.name.clone(),
            image_reference: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.posts.lock().unwrap().push(record.clone());
        record
    }

    pub fn post_slugs(&self) -> Vec<String> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .map(|post| post.slug.clone())
            .collect()
    }

    pub fn approve_comment(&self, id: Uuid) {
        let mut comments = self.comments.lock().unwrap();
        if let Some(comment) = comments.iter_mut().find(|comment| comment.id == id) {
            comment.active = true;
        }
    }

    fn category_by_id(&self, id: Uuid) -> Option<CategoryRecord> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|category| category.id == id)
            .cloned()
    }

    fn matches(post: &PostRecord, filter: &PostQueryFilter) -> bool {
        if let Some(category) = filter.category.as_deref() {
            let wanted = category.to_lowercase();
            if post.category_slug.to_lowercase() != wanted
                && post.category_name.to_lowercase() != wanted
            {
                return false;
            }
        }
        if let Some(search) = filter.search.as_deref() {
            let needle = search.to_lowercase();
            if !post.title.to_lowercase().contains(&needle)
                && !post.content.to_lowercase().contains(&needle)
                && !post.author_name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl PostsRepo for InMemoryRepositories {
    async fn list_posts(&self, filter: &PostQueryFilter) -> Result<Vec<PostRecord>, RepoError> {
        let mut posts: Vec<PostRecord> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| Self::matches(post, filter))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        let mut posts: Vec<PostRecord> = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|post| post.slug == slug)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .any(|post| post.slug == slug))
    }

    async fn count_posts(&self) -> Result<u64, RepoError> {
        Ok(self.posts.lock().unwrap().len() as u64)
    }

    fn stream_all(&self) -> BoxStream<'_, Result<PostRecord, RepoError>> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| a.slug.cmp(&b.slug));
        Box::pin(stream::iter(posts.into_iter().map(Ok)))
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let category = self
            .category_by_id(params.category_id)
            .ok_or(RepoError::NotFound)?;

        if self
            .posts
            .lock()
            .unwrap()
            .iter()
            .any(|post| post.slug == params.slug)
        {
            return Err(RepoError::Duplicate {
                constraint: "posts_slug_key".to_string(),
            });
        }

        let record = PostRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            title: params.title,
            author_name: params.author_name,
            content: params.content,
            category_slug: category.slug,
            category_name: category.name,
            image_reference: params.image_reference,
            created_at: OffsetDateTime::now_utc(),
        };
        self.posts.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let category = self
            .category_by_id(params.category_id)
            .ok_or(RepoError::NotFound)?;

        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|post| post.id == params.id)
            .ok_or(RepoError::NotFound)?;

        post.title = params.title;
        post.author_name = params.author_name;
        post.content = params.content;
        post.category_slug = category.slug;
        post.category_name = category.name;
        post.image_reference = params.image_reference;

        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoriesRepo for InMemoryRepositories {
    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut categories = self.categories.lock().unwrap().clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn count_categories(&self) -> Result<u64, RepoError> {
        Ok(self.categories.lock().unwrap().len() as u64)
    }
}

#[async_trait]
impl TagsRepo for InMemoryRepositories {
    async fn list_all(&self) -> Result<Vec<TagRecord>, RepoError> {
        Ok(self.tags.lock().unwrap().clone())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let links = self.post_tags.lock().unwrap();
        let tag_ids: Vec<Uuid> = links
            .iter()
            .filter(|(post, _)| *post == post_id)
            .map(|(_, tag)| *tag)
            .collect();
        Ok(self
            .tags
            .lock()
            .unwrap()
            .iter()
            .filter(|tag| tag_ids.contains(&tag.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TagsWriteRepo for InMemoryRepositories {
    async fn ensure_tag(&self, slug: &str, name: &str) -> Result<TagRecord, RepoError> {
        let mut tags = self.tags.lock().unwrap();
        if let Some(tag) = tags.iter().find(|tag| tag.slug == slug) {
            return Ok(tag.clone());
        }
        let record = TagRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: name.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        tags.push(record.clone());
        Ok(record)
    }

    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut links = self.post_tags.lock().unwrap();
        links.retain(|(post, _)| *post != post_id);
        links.extend(tag_ids.iter().map(|tag| (post_id, *tag)));
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for InMemoryRepositories {
    async fn insert_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let record = CommentRecord {
            id: Uuid::new_v4(),
            post_id: params.post_id,
            author_name: params.author_name,
            email: params.email,
            body: params.body,
            active: params.active,
            created_at: OffsetDateTime::now_utc(),
        };
        self.comments.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let mut comments: Vec<CommentRecord> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|comment| comment.post_id == post_id && comment.active)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn count_comments(&self) -> Result<u64, RepoError> {
        Ok(self.comments.lock().unwrap().len() as u64)
    }
}

/// Scriptable stand-in for the remote blog service client.
#[derive(Default)]
pub struct StubRemote {
    pub records: Mutex<Vec<RemoteBlogRecord>>,
    pub fail_create: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_lookup: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_count: AtomicBool,
    /// Slugs whose mirrored create should be rejected.
    pub reject_slugs: Mutex<HashSet<String>>,
    pub created: Mutex<Vec<RemotePostFields>>,
    pub updated: Mutex<Vec<(i64, RemotePostFields)>>,
    pub deleted: Mutex<Vec<i64>>,
}

impl StubRemote {
    pub fn seed_record(&self, id: i64, slug: &str, category: &str) -> RemoteBlogRecord {
        let record = RemoteBlogRecord {
            id: Some(id),
            slug: slug.to_string(),
            title: format!("Remote {slug}"),
            author_name: "Remote Author".to_string(),
            content: "remote body".to_string(),
            category: category.to_string(),
            image: None,
            date: None,
        };
        self.records.lock().unwrap().push(record.clone());
        record
    }

    pub fn reject_slug(&self, slug: &str) {
        self.reject_slugs.lock().unwrap().insert(slug.to_string());
    }
}

#[async_trait]
impl RemoteBlogApi for StubRemote {
    async fn create(
        &self,
        fields: &RemotePostFields,
        _image: Option<&ImageAttachment>,
    ) -> Result<(), RemoteError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected { status: 500 });
        }
        if self.reject_slugs.lock().unwrap().contains(&fields.slug) {
            return Err(RemoteError::Rejected { status: 500 });
        }
        self.created.lock().unwrap().push(fields.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<RemoteBlogRecord>, RemoteError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<RemoteBlogRecord>, RemoteError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.slug == slug)
            .cloned())
    }

    async fn update(
        &self,
        id: i64,
        fields: &RemotePostFields,
        _image: Option<&ImageAttachment>,
    ) -> Result<(), RemoteError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected { status: 500 });
        }
        self.updated.lock().unwrap().push((id, fields.clone()));
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected { status: 500 });
        }
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, RemoteError> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("timeout".to_string()));
        }
        Ok(self.records.lock().unwrap().len() as u64)
    }
}
