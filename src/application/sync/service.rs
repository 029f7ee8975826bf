use std::sync::Arc;

use futures::StreamExt;
use metrics::counter;
use tracing::{debug, warn};
use url::Url;

use crate::application::error::ServiceError;
use crate::application::pagination::{BLOG_PAGE_SIZE, PageNumber, paginate};
use crate::application::query::{self, PostView};
use crate::application::remote::{
    ImageAttachment, RemoteBlogApi, RemoteBlogRecord, RemotePostFields,
};
use crate::application::repos::{
    CategoriesRepo, CommentsRepo, CreatePostParams, PostQueryFilter, PostsRepo, PostsWriteRepo,
    TagsRepo, TagsWriteRepo, UpdatePostParams,
};
use crate::application::sync::media::resolve_image_url;
use crate::application::sync::types::{
    ContentSource, DeleteReceipt, NewPost, PostDetail, PostFeed, PostReceipt, PostUpdate,
    ResyncReport, StatsReport, SyncStatus,
};
use crate::domain::entities::{CategoryRecord, CommentRecord, PostRecord, TagRecord};
use crate::domain::slug::{SlugAsyncError, derive_slug, generate_unique_slug_async};

/// Relative media prefix recorded for locally attached images.
const LOCAL_IMAGE_PREFIX: &str = "blog/images";

/// Orchestrates the two stores: the local content store is authoritative for
/// writes, the remote service is preferred for reads.
#[derive(Clone)]
pub struct ContentSync {
    posts: Arc<dyn PostsRepo>,
    posts_write: Arc<dyn PostsWriteRepo>,
    categories: Arc<dyn CategoriesRepo>,
    tags: Arc<dyn TagsRepo>,
    tags_write: Arc<dyn TagsWriteRepo>,
    comments: Arc<dyn CommentsRepo>,
    remote: Arc<dyn RemoteBlogApi>,
    remote_base: Url,
}

impl ContentSync {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        posts_write: Arc<dyn PostsWriteRepo>,
        categories: Arc<dyn CategoriesRepo>,
        tags: Arc<dyn TagsRepo>,
        tags_write: Arc<dyn TagsWriteRepo>,
        comments: Arc<dyn CommentsRepo>,
        remote: Arc<dyn RemoteBlogApi>,
        remote_base: Url,
    ) -> Self {
        Self {
            posts,
            posts_write,
            categories,
            tags,
            tags_write,
            comments,
            remote,
            remote_base,
        }
    }

    /// Dual-write create: persist locally, then mirror to the remote service.
    /// Mirror failure downgrades the receipt, it never rolls back the local
    /// write.
    pub async fn create_post(&self, new_post: NewPost) -> Result<PostReceipt, ServiceError> {
        let category = self.resolve_category(&new_post.category).await?;
        let slug = self.assign_slug(new_post.slug.as_deref(), &new_post.title).await?;

        let image_reference = new_post
            .image
            .as_ref()
            .map(|attachment| format!("{LOCAL_IMAGE_PREFIX}/{}", attachment.filename));

        let record = self
            .posts_write
            .create_post(CreatePostParams {
                slug,
                title: new_post.title,
                author_name: new_post.author_name,
                content: new_post.content,
                category_id: category.id,
                image_reference,
            })
            .await?;

        self.attach_tags(&record, &new_post.tags).await?;

        let sync = self
            .mirror_create(&record, new_post.image.as_ref())
            .await;

        Ok(PostReceipt { post: record, sync })
    }

    /// Remote-primary listing with local fallback. The feed is tagged with
    /// the store that served it so links and image URLs resolve correctly.
    pub async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        page: PageNumber,
    ) -> Result<PostFeed, ServiceError> {
        match self.remote.list().await {
            Ok(records) if !records.is_empty() => {
                let views = records
                    .iter()
                    .map(|record| self.view_from_remote(record))
                    .collect();
                let views = query::apply_filter(views, filter);
                Ok(PostFeed {
                    page: paginate(views, BLOG_PAGE_SIZE, page),
                    source: ContentSource::Remote,
                })
            }
            Ok(_) => {
                debug!("remote listing empty, serving local posts");
                self.list_local(filter, page).await
            }
            Err(err) => {
                warn!(error = %err, "remote listing failed, serving local posts");
                counter!("foglio_read_fallback_total").increment(1);
                self.list_local(filter, page).await
            }
        }
    }

    /// Latest local posts for sidebars and the recent feed.
    pub async fn recent_posts(&self, limit: u32) -> Result<Vec<PostView>, ServiceError> {
        let records = self.posts.list_recent(limit).await?;
        Ok(records.iter().map(PostView::from_local).collect())
    }

    /// Remote-primary detail read with local fallback; misses in both stores
    /// surface as not-found.
    pub async fn get_post(&self, slug: &str) -> Result<PostDetail, ServiceError> {
        match self.remote.get_by_slug(slug).await {
            Ok(Some(record)) => {
                let post = self.view_from_remote(&record);
                let related = match self.remote.list().await {
                    Ok(records) => {
                        let views: Vec<PostView> = records
                            .iter()
                            .map(|record| self.view_from_remote(record))
                            .collect();
                        query::related_posts(&views, &post)
                    }
                    Err(err) => {
                        debug!(error = %err, slug, "related posts unavailable from remote");
                        Vec::new()
                    }
                };
                let (comments, tags) = self.local_annotations(slug).await?;
                Ok(PostDetail {
                    post,
                    related,
                    comments,
                    tags,
                    source: ContentSource::Remote,
                })
            }
            Ok(None) => self.get_local(slug).await,
            Err(err) => {
                warn!(error = %err, slug, "remote detail read failed, falling back to local");
                counter!("foglio_read_fallback_total").increment(1);
                self.get_local(slug).await
            }
        }
    }

    /// Dual-write update. The remote counterpart is located by slug; when the
    /// remote store has never seen this post the mirror degrades to a create.
    pub async fn update_post(
        &self,
        slug: &str,
        update: PostUpdate,
    ) -> Result<PostReceipt, ServiceError> {
        let existing = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;
        let category = self.resolve_category(&update.category).await?;

        let image_reference = update
            .image
            .as_ref()
            .map(|attachment| format!("{LOCAL_IMAGE_PREFIX}/{}", attachment.filename))
            .or_else(|| existing.image_reference.clone());

        let record = self
            .posts_write
            .update_post(UpdatePostParams {
                id: existing.id,
                title: update.title,
                author_name: update.author_name,
                content: update.content,
                category_id: category.id,
                image_reference,
            })
            .await?;

        if let Some(tags) = update.tags.as_deref() {
            self.attach_tags(&record, tags).await?;
        }

        let sync = self.mirror_update(&record, update.image.as_ref()).await;

        Ok(PostReceipt { post: record, sync })
    }

    /// Dual-write delete, symmetric with create: the local record goes first,
    /// then the remote counterpart (located by slug) is removed.
    pub async fn delete_post(&self, slug: &str) -> Result<DeleteReceipt, ServiceError> {
        let existing = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;

        // Resolve the remote counterpart before the local row disappears.
        let remote_target = self.remote.get_by_slug(slug).await;

        self.posts_write.delete_post(existing.id).await?;

        let sync = match remote_target {
            Ok(Some(RemoteBlogRecord { id: Some(id), .. })) => match self.remote.delete(id).await {
                Ok(()) => {
                    counter!("foglio_remote_mirror_success_total").increment(1);
                    SyncStatus::Mirrored
                }
                Err(err) => {
                    warn!(error = %err, slug, "remote mirror delete failed");
                    counter!("foglio_remote_mirror_failure_total").increment(1);
                    SyncStatus::SyncFailed
                }
            },
            // No remote counterpart: the mirror has nothing to remove.
            Ok(_) => SyncStatus::Mirrored,
            Err(err) => {
                warn!(error = %err, slug, "remote lookup for mirror delete failed");
                counter!("foglio_remote_mirror_failure_total").increment(1);
                SyncStatus::SyncFailed
            }
        };

        Ok(DeleteReceipt {
            slug: existing.slug,
            sync,
        })
    }

    /// Best-effort sweep: one mirrored create per local post, sequentially,
    /// no retry. Store errors abort the sweep; remote failures only count.
    pub async fn resync_all(&self) -> Result<ResyncReport, ServiceError> {
        let mut report = ResyncReport::default();
        let mut stream = self.posts.stream_all();

        while let Some(next) = stream.next().await {
            let record = next?;
            report.attempted += 1;
            match self
                .remote
                .create(&Self::remote_fields(&record), None)
                .await
            {
                Ok(()) => report.mirrored += 1,
                Err(err) => {
                    warn!(error = %err, slug = %record.slug, "resync mirror failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    pub async fn stats(&self) -> Result<StatsReport, ServiceError> {
        let local_posts = self.posts.count_posts().await?;
        let categories = self.categories.count_categories().await?;
        let comments = self.comments.count_comments().await?;
        let remote_posts = match self.remote.count().await {
            Ok(count) => Some(count),
            Err(err) => {
                debug!(error = %err, "remote post count unavailable");
                None
            }
        };

        Ok(StatsReport {
            local_posts,
            categories,
            comments,
            remote_posts,
        })
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, ServiceError> {
        Ok(self.categories.list_all().await?)
    }

    async fn list_local(
        &self,
        filter: &PostQueryFilter,
        page: PageNumber,
    ) -> Result<PostFeed, ServiceError> {
        let records = self.posts.list_posts(filter).await?;
        let views: Vec<PostView> = records.iter().map(PostView::from_local).collect();
        Ok(PostFeed {
            page: paginate(views, BLOG_PAGE_SIZE, page),
            source: ContentSource::Local,
        })
    }

    async fn get_local(&self, slug: &str) -> Result<PostDetail, ServiceError> {
        let record = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;
        let post = PostView::from_local(&record);

        let all = self.posts.list_posts(&PostQueryFilter::default()).await?;
        let views: Vec<PostView> = all.iter().map(PostView::from_local).collect();
        let related = query::related_posts(&views, &post);

        let comments = self.comments.list_active_for_post(record.id).await?;
        let tags = self.tags.list_for_post(record.id).await?;

        Ok(PostDetail {
            post,
            related,
            comments,
            tags,
            source: ContentSource::Local,
        })
    }

    async fn resolve_category(&self, slug: &str) -> Result<CategoryRecord, ServiceError> {
        self.categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::validation(format!("unknown category `{slug}`")))
    }

    async fn assign_slug(
        &self,
        requested: Option<&str>,
        title: &str,
    ) -> Result<String, ServiceError> {
        if let Some(requested) = requested {
            let slug = derive_slug(requested)
                .map_err(|err| ServiceError::validation(err.to_string()))?;
            if self.posts.slug_exists(&slug).await? {
                return Err(ServiceError::validation(format!(
                    "slug `{slug}` is already taken"
                )));
            }
            return Ok(slug);
        }

        let posts = self.posts.clone();
        generate_unique_slug_async(title, move |candidate| {
            let posts = posts.clone();
            let candidate = candidate.to_string();
            async move { posts.slug_exists(&candidate).await.map(|exists| !exists) }
        })
        .await
        .map_err(|err| match err {
            SlugAsyncError::Slug(err) => ServiceError::validation(err.to_string()),
            SlugAsyncError::Predicate(err) => ServiceError::Store(err),
        })
    }

    async fn attach_tags(&self, record: &PostRecord, names: &[String]) -> Result<(), ServiceError> {
        let mut tag_ids = Vec::with_capacity(names.len());
        for name in names {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                continue;
            }
            let slug = derive_slug(trimmed)
                .map_err(|err| ServiceError::validation(err.to_string()))?;
            let tag = self.tags_write.ensure_tag(&slug, trimmed).await?;
            tag_ids.push(tag.id);
        }
        self.tags_write
            .replace_post_tags(record.id, &tag_ids)
            .await?;
        Ok(())
    }

    async fn mirror_create(
        &self,
        record: &PostRecord,
        image: Option<&ImageAttachment>,
    ) -> SyncStatus {
        match self
            .remote
            .create(&Self::remote_fields(record), image)
            .await
        {
            Ok(()) => {
                counter!("foglio_remote_mirror_success_total").increment(1);
                SyncStatus::Mirrored
            }
            Err(err) => {
                warn!(error = %err, slug = %record.slug, "remote mirror create failed");
                counter!("foglio_remote_mirror_failure_total").increment(1);
                SyncStatus::SyncFailed
            }
        }
    }

    async fn mirror_update(
        &self,
        record: &PostRecord,
        image: Option<&ImageAttachment>,
    ) -> SyncStatus {
        match self.remote.get_by_slug(&record.slug).await {
            Ok(Some(RemoteBlogRecord { id: Some(id), .. })) => {
                match self
                    .remote
                    .update(id, &Self::remote_fields(record), image)
                    .await
                {
                    Ok(()) => {
                        counter!("foglio_remote_mirror_success_total").increment(1);
                        SyncStatus::Mirrored
                    }
                    Err(err) => {
                        warn!(error = %err, slug = %record.slug, "remote mirror update failed");
                        counter!("foglio_remote_mirror_failure_total").increment(1);
                        SyncStatus::SyncFailed
                    }
                }
            }
            // Never mirrored (or the remote assigned no usable ID): converge
            // the stores the same way the resync sweep does.
            Ok(_) => self.mirror_create(record, image).await,
            Err(err) => {
                warn!(error = %err, slug = %record.slug, "remote lookup for mirror update failed");
                counter!("foglio_remote_mirror_failure_total").increment(1);
                SyncStatus::SyncFailed
            }
        }
    }

    /// The local counterpart's comments and tags, when one exists. Remote-only
    /// posts simply have none.
    async fn local_annotations(
        &self,
        slug: &str,
    ) -> Result<(Vec<CommentRecord>, Vec<TagRecord>), ServiceError> {
        match self.posts.find_by_slug(slug).await? {
            Some(record) => {
                let comments = self.comments.list_active_for_post(record.id).await?;
                let tags = self.tags.list_for_post(record.id).await?;
                Ok((comments, tags))
            }
            None => Ok((Vec::new(), Vec::new())),
        }
    }

    fn remote_fields(record: &PostRecord) -> RemotePostFields {
        RemotePostFields {
            title: record.title.clone(),
            slug: record.slug.clone(),
            author_name: record.author_name.clone(),
            content: record.content.clone(),
            category: record.category_name.clone(),
        }
    }

    fn view_from_remote(&self, record: &RemoteBlogRecord) -> PostView {
        PostView {
            slug: record.slug.clone(),
            title: record.title.clone(),
            author_name: record.author_name.clone(),
            content: record.content.clone(),
            category: record.category.clone(),
            image_url: record
                .image
                .as_deref()
                .map(|reference| resolve_image_url(&self.remote_base, reference)),
            created_at: None,
        }
    }
}
