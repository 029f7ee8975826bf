//! Policy tests for the synchronization layer: dual-write, fallback reads,
//! and the bulk resync sweep, exercised over in-memory adapters.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use url::Url;

use common::{InMemoryRepositories, StubRemote};
use foglio::application::comments::{CommentService, NewComment};
use foglio::application::pagination::PageNumber;
use foglio::application::repos::{PostQueryFilter, PostsRepo};
use foglio::application::sync::{ContentSource, ContentSync, NewPost, PostUpdate, SyncStatus};

fn build_sync(repos: &Arc<InMemoryRepositories>, remote: &Arc<StubRemote>) -> ContentSync {
    ContentSync::new(
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        remote.clone(),
        Url::parse("http://remote.example:8001/").expect("remote base"),
    )
}

fn new_post(title: &str, category: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        slug: None,
        author_name: "Nadia".to_string(),
        content: "body text".to_string(),
        category: category.to_string(),
        tags: Vec::new(),
        image: None,
    }
}

#[tokio::test]
async fn create_persists_locally_and_mirrors_remotely() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    repos.seed_category("travel", "Travel");
    let sync = build_sync(&repos, &remote);

    let receipt = sync
        .create_post(new_post("A Week in the Dolomites", "travel"))
        .await
        .expect("create succeeds");

    assert_eq!(receipt.post.slug, "a-week-in-the-dolomites");
    assert_eq!(receipt.sync, SyncStatus::Mirrored);

    let stored = repos
        .find_by_slug("a-week-in-the-dolomites")
        .await
        .expect("lookup")
        .expect("post stored locally");
    assert_eq!(stored.category_name, "Travel");

    let mirrored = remote.created.lock().unwrap();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].slug, "a-week-in-the-dolomites");
    assert_eq!(mirrored[0].category, "Travel");
}

#[tokio::test]
async fn mirror_failure_downgrades_create_to_partial_success() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    remote.fail_create.store(true, Ordering::SeqCst);
    repos.seed_category("travel", "Travel");
    let sync = build_sync(&repos, &remote);

    let receipt = sync
        .create_post(new_post("Stormbound", "travel"))
        .await
        .expect("local write still succeeds");

    assert_eq!(receipt.sync, SyncStatus::SyncFailed);
    assert!(repos.post_slugs().contains(&"stormbound".to_string()));
}

#[tokio::test]
async fn colliding_titles_receive_suffixed_slugs() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    repos.seed_category("travel", "Travel");
    let sync = build_sync(&repos, &remote);

    let first = sync
        .create_post(new_post("City Notes", "travel"))
        .await
        .expect("first create");
    let second = sync
        .create_post(new_post("City Notes", "travel"))
        .await
        .expect("second create");

    assert_eq!(first.post.slug, "city-notes");
    assert_eq!(second.post.slug, "city-notes-2");
}

#[tokio::test]
async fn explicit_duplicate_slug_is_rejected() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("taken", "Taken", &category);
    let sync = build_sync(&repos, &remote);

    let mut post = new_post("Another", "travel");
    post.slug = Some("taken".to_string());
    let err = sync.create_post(post).await.expect_err("duplicate rejected");
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn unknown_category_is_a_validation_error() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let sync = build_sync(&repos, &remote);

    let err = sync
        .create_post(new_post("Lost", "no-such-category"))
        .await
        .expect_err("unknown category rejected");
    assert!(!err.is_not_found());
    assert!(remote.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn listing_prefers_the_remote_source_and_resolves_image_urls() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    remote.seed_record(1, "remote-post", "Travel");
    remote.records.lock().unwrap()[0].image = Some("/media/x.jpg".to_string());
    let sync = build_sync(&repos, &remote);

    let feed = sync
        .list_posts(&PostQueryFilter::default(), PageNumber::default())
        .await
        .expect("listing");

    assert_eq!(feed.source, ContentSource::Remote);
    assert_eq!(feed.page.items.len(), 1);
    assert_eq!(
        feed.page.items[0].image_url.as_deref(),
        Some("http://remote.example:8001/media/x.jpg")
    );
}

#[tokio::test]
async fn listing_falls_back_to_local_when_remote_fails() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    remote.fail_list.store(true, Ordering::SeqCst);
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("local-post", "Local Post", &category);
    let sync = build_sync(&repos, &remote);

    let feed = sync
        .list_posts(&PostQueryFilter::default(), PageNumber::default())
        .await
        .expect("listing");

    assert_eq!(feed.source, ContentSource::Local);
    assert_eq!(feed.page.items.len(), 1);
    assert_eq!(feed.page.items[0].slug, "local-post");
}

#[tokio::test]
async fn empty_remote_listing_counts_as_a_miss() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("local-post", "Local Post", &category);
    let sync = build_sync(&repos, &remote);

    let feed = sync
        .list_posts(&PostQueryFilter::default(), PageNumber::default())
        .await
        .expect("listing");

    assert_eq!(feed.source, ContentSource::Local);
    assert_eq!(feed.page.items.len(), 1);
}

#[tokio::test]
async fn listing_pagination_clamps_out_of_range_pages() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let category = repos.seed_category("travel", "Travel");
    for i in 0..13 {
        repos.seed_post(&format!("post-{i}"), &format!("Post {i}"), &category);
    }
    let sync = build_sync(&repos, &remote);

    let page = sync
        .list_posts(&PostQueryFilter::default(), PageNumber::new(99))
        .await
        .expect("listing");

    assert_eq!(page.page.number, 3);
    assert_eq!(page.page.total_pages, 3);
    assert_eq!(page.page.items.len(), 1);
}

#[tokio::test]
async fn detail_from_remote_selects_same_category_related_posts() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    for i in 1..=5 {
        remote.seed_record(i, &format!("travel-{i}"), "Travel");
    }
    for i in 1..=3 {
        remote.seed_record(10 + i, &format!("food-{i}"), "Food");
    }
    let sync = build_sync(&repos, &remote);

    let detail = sync.get_post("travel-1").await.expect("detail");

    assert_eq!(detail.source, ContentSource::Remote);
    assert_eq!(detail.related.len(), 3);
    assert!(detail.related.iter().all(|view| view.category == "Travel"));
    assert!(detail.related.iter().all(|view| view.slug != "travel-1"));
}

#[tokio::test]
async fn detail_falls_back_to_local_and_misses_surface_as_not_found() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    remote.fail_lookup.store(true, Ordering::SeqCst);
    remote.fail_list.store(true, Ordering::SeqCst);
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("local-only", "Local Only", &category);
    let sync = build_sync(&repos, &remote);

    let detail = sync.get_post("local-only").await.expect("local fallback");
    assert_eq!(detail.source, ContentSource::Local);

    let err = sync
        .get_post("missing-everywhere")
        .await
        .expect_err("miss in both stores");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_mirrors_through_the_remote_id() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let category = repos.seed_category("travel", "Travel");
    repos.seed_category("food", "Food");
    repos.seed_post("shared-slug", "Shared", &category);
    remote.seed_record(7, "shared-slug", "Travel");
    let sync = build_sync(&repos, &remote);

    let receipt = sync
        .update_post(
            "shared-slug",
            PostUpdate {
                title: "Shared, revised".to_string(),
                author_name: "Nadia".to_string(),
                content: "revised body".to_string(),
                category: "food".to_string(),
                tags: None,
                image: None,
            },
        )
        .await
        .expect("update succeeds");

    assert_eq!(receipt.sync, SyncStatus::Mirrored);
    assert_eq!(receipt.post.title, "Shared, revised");
    assert_eq!(receipt.post.category_slug, "food");

    let updated = remote.updated.lock().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, 7);
    assert_eq!(updated[0].1.title, "Shared, revised");
}

#[tokio::test]
async fn update_without_remote_counterpart_mirrors_a_create() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("local-only", "Local Only", &category);
    let sync = build_sync(&repos, &remote);

    let receipt = sync
        .update_post(
            "local-only",
            PostUpdate {
                title: "Local Only, revised".to_string(),
                author_name: "Nadia".to_string(),
                content: "revised".to_string(),
                category: "travel".to_string(),
                tags: None,
                image: None,
            },
        )
        .await
        .expect("update succeeds");

    assert_eq!(receipt.sync, SyncStatus::Mirrored);
    assert!(remote.updated.lock().unwrap().is_empty());
    assert_eq!(remote.created.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_removes_both_copies() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("doomed", "Doomed", &category);
    remote.seed_record(42, "doomed", "Travel");
    let sync = build_sync(&repos, &remote);

    let receipt = sync.delete_post("doomed").await.expect("delete succeeds");

    assert_eq!(receipt.sync, SyncStatus::Mirrored);
    assert!(repos.post_slugs().is_empty());
    assert_eq!(*remote.deleted.lock().unwrap(), vec![42]);
}

#[tokio::test]
async fn delete_still_succeeds_locally_when_the_mirror_fails() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    remote.fail_lookup.store(true, Ordering::SeqCst);
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("doomed", "Doomed", &category);
    let sync = build_sync(&repos, &remote);

    let receipt = sync.delete_post("doomed").await.expect("local delete");

    assert_eq!(receipt.sync, SyncStatus::SyncFailed);
    assert!(repos.post_slugs().is_empty());
}

#[tokio::test]
async fn resync_reports_per_record_outcomes_without_raising() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let category = repos.seed_category("travel", "Travel");
    for i in 0..5 {
        repos.seed_post(&format!("post-{i}"), &format!("Post {i}"), &category);
    }
    remote.reject_slug("post-1");
    remote.reject_slug("post-3");
    let sync = build_sync(&repos, &remote);

    let report = sync.resync_all().await.expect("sweep completes");

    assert_eq!(report.attempted, 5);
    assert_eq!(report.mirrored, 3);
    assert_eq!(report.failed, 2);
}

#[tokio::test]
async fn stats_degrade_gracefully_when_the_remote_is_down() {
    let repos = Arc::new(InMemoryRepositories::default());
    let remote = Arc::new(StubRemote::default());
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("one", "One", &category);
    remote.seed_record(1, "one", "Travel");
    let sync = build_sync(&repos, &remote);

    let stats = sync.stats().await.expect("stats");
    assert_eq!(stats.local_posts, 1);
    assert_eq!(stats.categories, 1);
    assert_eq!(stats.remote_posts, Some(1));

    remote.fail_count.store(true, Ordering::SeqCst);
    let degraded = sync.stats().await.expect("stats still succeed");
    assert_eq!(degraded.remote_posts, None);
}

#[tokio::test]
async fn new_comments_are_held_for_moderation() {
    let repos = Arc::new(InMemoryRepositories::default());
    let category = repos.seed_category("travel", "Travel");
    repos.seed_post("commented", "Commented", &category);
    let comments = CommentService::new(repos.clone(), repos.clone());

    let comment = comments
        .add_comment(
            "commented",
            NewComment {
                author_name: "Reader".to_string(),
                email: "reader@example.com".to_string(),
                body: "Lovely writeup".to_string(),
            },
        )
        .await
        .expect("comment accepted");
    assert!(!comment.active);

    let visible = comments.list_comments("commented").await.expect("listing");
    assert!(visible.is_empty());

    repos.approve_comment(comment.id);
    let visible = comments.list_comments("commented").await.expect("listing");
    assert_eq!(visible.len(), 1);

    let err = comments
        .list_comments("no-such-post")
        .await
        .expect_err("missing post");
    assert!(err.is_not_found());
}
