//! Presentation-side shaping: filtering, search, and related-post selection.
//!
//! The same operations apply whether a sequence was fetched from the local
//! store or decoded from the remote service, so they work over [`PostView`],
//! the store-agnostic projection both sources convert into.

use serde::Serialize;
use slug::slugify;
use time::OffsetDateTime;

use crate::application::repos::PostQueryFilter;
use crate::domain::entities::PostRecord;

/// Maximum number of related posts surfaced next to a detail view.
pub const RELATED_LIMIT: usize = 3;

/// A post as presented to readers, independent of which store it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub author_name: String,
    pub content: String,
    /// Category display label; matched by slugified comparison so both the
    /// local slug and the remote free-form label filter identically.
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: Option<OffsetDateTime>,
}

impl PostView {
    /// Project a locally stored post. Local image references stay relative;
    /// resolution against the remote origin only applies to remote records.
    pub fn from_local(record: &PostRecord) -> Self {
        Self {
            slug: record.slug.clone(),
            title: record.title.clone(),
            author_name: record.author_name.clone(),
            content: record.content.clone(),
            category: record.category_name.clone(),
            image_url: record.image_reference.clone(),
            created_at: Some(record.created_at),
        }
    }
}

/// Case-insensitive category match tolerant of slug-vs-label spellings.
pub fn category_matches(candidate: &str, wanted: &str) -> bool {
    slugify(candidate) == slugify(wanted)
}

fn search_matches(view: &PostView, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    view.title.to_lowercase().contains(&needle)
        || view.content.to_lowercase().contains(&needle)
        || view.author_name.to_lowercase().contains(&needle)
}

/// Apply the listing filter to an in-memory sequence, preserving order.
pub fn apply_filter(views: Vec<PostView>, filter: &PostQueryFilter) -> Vec<PostView> {
    let mut views = views;

    if let Some(category) = filter.category.as_deref() {
        views.retain(|view| category_matches(&view.category, category));
    }

    if let Some(search) = filter.search.as_deref() {
        let trimmed = search.trim();
        if !trimmed.is_empty() {
            views.retain(|view| search_matches(view, trimmed));
        }
    }

    views
}

/// Select up to [`RELATED_LIMIT`] other posts sharing the subject's category,
/// in listing order.
pub fn related_posts(all: &[PostView], subject: &PostView) -> Vec<PostView> {
    all.iter()
        .filter(|view| view.slug != subject.slug)
        .filter(|view| category_matches(&view.category, &subject.category))
        .take(RELATED_LIMIT)
        .cloned()
        .collect()
}
