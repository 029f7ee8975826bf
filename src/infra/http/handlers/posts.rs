//! Post handlers: listing, detail, and the dual-write mutations.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::pagination::PageNumber;
use crate::application::remote::ImageAttachment;
use crate::application::repos::PostQueryFilter;
use crate::application::sync::{NewPost, PostUpdate};
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{PostListQuery, RecentQuery};
use crate::infra::http::state::HttpState;

const DEFAULT_RECENT_LIMIT: u32 = 5;

pub async fn list(
    State(state): State<HttpState>,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PostQueryFilter {
        category: query.category,
        search: query.q,
    };
    let page = PageNumber::parse(query.page.as_deref());

    let feed = state.sync.list_posts(&filter, page).await?;
    Ok(Json(feed))
}

pub async fn recent(
    State(state): State<HttpState>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, 50);
    let posts = state.sync.recent_posts(limit).await?;
    Ok(Json(posts))
}

pub async fn detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state.sync.get_post(&slug).await?;
    Ok(Json(detail))
}

pub async fn create(
    State(state): State<HttpState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = PostForm::read(multipart).await?;

    let title = form.require("title")?;
    let author_name = form.require_author()?;
    let content = form.require("content")?;
    let category = form.require_category()?;

    let new_post = NewPost {
        title,
        slug: form.slug,
        author_name,
        content,
        category,
        tags: form.tags,
        image: form.image,
    };

    let receipt = state.sync.create_post(new_post).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn update(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = PostForm::read(multipart).await?;

    let title = form.require("title")?;
    let author_name = form.require_author()?;
    let content = form.require("content")?;
    let category = form.require_category()?;

    let update = PostUpdate {
        title,
        author_name,
        content,
        category,
        tags: form.tags_submitted.then_some(form.tags),
        image: form.image,
    };

    let receipt = state.sync.update_post(&slug, update).await?;
    Ok(Json(receipt))
}

pub async fn delete(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = state.sync.delete_post(&slug).await?;
    Ok(Json(receipt))
}

/// Multipart post form shared by create and update. Field spellings accept
/// both this service's names and the remote wire spellings so the same form
/// posts everywhere.
#[derive(Debug, Default, Clone)]
struct PostForm {
    title: Option<String>,
    slug: Option<String>,
    author_name: Option<String>,
    content: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    tags_submitted: bool,
    image: Option<ImageAttachment>,
}

impl PostForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::bad_request(format!("malformed multipart body: {err}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                let filename = field
                    .file_name()
                    .filter(|value| !value.is_empty())
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field.content_type().map(str::to_string).unwrap_or_else(|| {
                    mime_guess::from_path(&filename)
                        .first_or_octet_stream()
                        .to_string()
                });
                let bytes = field.bytes().await.map_err(|err| {
                    ApiError::bad_request(format!("failed to read image part: {err}"))
                })?;
                if !bytes.is_empty() {
                    form.image = Some(ImageAttachment {
                        filename,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|err| ApiError::bad_request(format!("failed to read `{name}`: {err}")))?;

            match name.as_str() {
                "title" => form.title = Some(value),
                "slug" => form.slug = non_empty(value),
                "author_name" | "Author_name" => form.author_name = Some(value),
                "content" => form.content = Some(value),
                "category" | "Category" => form.category = Some(value),
                "tags" => {
                    form.tags_submitted = true;
                    form.tags = value
                        .split(',')
                        .map(str::trim)
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn require(&self, name: &'static str) -> Result<String, ApiError> {
        let value = match name {
            "title" => self.title.as_deref(),
            "content" => self.content.as_deref(),
            _ => None,
        };
        value
            .map(str::to_string)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("missing form field `{name}`")))
    }

    fn require_author(&self) -> Result<String, ApiError> {
        self.author_name
            .clone()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("missing form field `author_name`"))
    }

    fn require_category(&self) -> Result<String, ApiError> {
        self.category
            .clone()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("missing form field `category`"))
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
