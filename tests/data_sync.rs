mod common;

use std::time::Duration;

use akasite::cache::QueryKey;
use akasite::domain::entities::ContactMessage;
use akasite::domain::types::{ChangeKind, MessageStatus, PostStatus, Table};
use axum::http::StatusCode;
use uuid::Uuid;

use common::{body_text, harness, location, message, post};

#[tokio::test]
async fn created_posts_show_up_on_the_public_blog() {
    let h = harness();
    let cookies = h.login().await;
    // Prime the cache so the create has something to invalidate.
    assert!(body_text(h.get("/blog").await).await.contains("No published articles yet"));

    let response = h
        .post_form(
            "/admin/blogs/new",
            "title=Launching+AKASite&author=Team&content=Hello&status=published&tags=rust%2C+web",
            Some(&cookies),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/blogs"));

    let body = body_text(h.get("/blog").await).await;
    assert!(body.contains("Launching AKASite"));

    let stored = h.app.blogs.read().await;
    assert_eq!(stored.data.len(), 1);
    assert_eq!(stored.data[0].tags, vec!["rust".to_string(), "web".to_string()]);
    assert!(stored.data[0].published_at.is_some());
}

#[tokio::test]
async fn invalid_editor_input_is_rejected_without_a_write() {
    let h = harness();
    let cookies = h.login().await;

    let response = h
        .post_form("/admin/blogs/new", "title=&author=Team", Some(&cookies))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("title"));
    assert_eq!(h.backend.write_count(), 0);
}

#[tokio::test]
async fn publishing_a_draft_makes_it_public() {
    let h = harness();
    let draft = post("Quietly drafted", PostStatus::Draft, false);
    let id = draft.id;
    h.backend.insert_posts(vec![draft]);
    let cookies = h.login().await;

    assert!(!body_text(h.get("/blog").await).await.contains("Quietly drafted"));

    let response = h
        .post_form(
            &format!("/admin/blogs/{id}/status"),
            "status=published",
            Some(&cookies),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(body_text(h.get("/blog").await).await.contains("Quietly drafted"));
    assert_eq!(
        h.get(&format!("/blog/{id}")).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn datastar_status_toggle_patches_panel_and_toast() {
    let h = harness();
    let draft = post("Toggle me", PostStatus::Draft, false);
    let id = draft.id;
    h.backend.insert_posts(vec![draft]);
    let cookies = h.login().await;

    let response = h
        .post_datastar(
            &format!("/admin/blogs/{id}/status"),
            "status=published",
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("data-admin-panel=\"blogs\""));
    assert!(body.contains("Unpublish"));
    assert!(body.contains("Blog Updated!"));
}

#[tokio::test]
async fn deleting_a_message_removes_it_from_reads() {
    let h = harness();
    let keep = message("Keep me", MessageStatus::Unread);
    let gone = message("Drop me", MessageStatus::Read);
    let gone_id = gone.id;
    h.backend.insert_messages(vec![keep, gone]);
    let cookies = h.login().await;
    assert_eq!(h.app.messages.read().await.data.len(), 2);

    let response = h
        .post_form(
            &format!("/admin/contacts/{gone_id}/delete"),
            "",
            Some(&cookies),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let remaining = h.app.messages.read().await;
    assert_eq!(remaining.data.len(), 1);
    assert_eq!(remaining.data[0].subject, "Keep me");
}

#[tokio::test]
async fn deleting_a_missing_message_fails_and_keeps_the_cache() {
    let h = harness();
    h.backend
        .insert_messages(vec![message("Still here", MessageStatus::Unread)]);
    let before = h.app.messages.read().await;
    let mut notices = h.app.cache.subscribe();

    let err = h
        .app
        .contact_mutations
        .delete(Uuid::new_v4())
        .await
        .expect_err("unknown id");
    assert!(err.is_not_found());
    assert_eq!(err.notification.title, "Error");

    assert!(notices.try_recv().is_err(), "no invalidation on failure");
    let after = h
        .app
        .cache
        .peek::<ContactMessage>()
        .expect("still cached");
    assert_eq!(after.data, before.data);
}

#[tokio::test]
async fn marking_a_message_read_updates_the_inbox() {
    let h = harness();
    let unread = message("Please call", MessageStatus::Unread);
    let id = unread.id;
    h.backend.insert_messages(vec![unread]);
    let cookies = h.login().await;

    let response = h
        .post_datastar(
            &format!("/admin/contacts/{id}/status"),
            &format!("status=read&selected={id}"),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Status Updated"));
    assert!(body.contains("Mark as Unread"));

    let messages = h.app.messages.read().await;
    assert_eq!(messages.data[0].status, MessageStatus::Read);
}

#[tokio::test]
async fn refetch_without_changes_yields_the_same_sequence() {
    let h = harness();
    h.backend.insert_posts(vec![
        post("One", PostStatus::Published, false),
        post("Two", PostStatus::Draft, false),
        post("Three", PostStatus::Published, true),
    ]);

    let first = h.app.blogs.read().await;
    let second = h.app.blogs.refetch().await;
    let ids = |posts: &[akasite::domain::entities::BlogPost]| {
        posts.iter().map(|post| post.id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first.data), ids(&second.data));
}

#[tokio::test]
async fn external_changes_invalidate_through_the_feed() {
    let h = harness();
    let _mount = h.app.realtime.mount(Table::Blogs).await.expect("mount");
    assert!(h.app.blogs.read().await.is_empty());

    let mut notices = h.app.cache.subscribe();
    h.backend
        .insert_posts(vec![post("Written elsewhere", PostStatus::Published, false)]);
    h.backend.emit_change(Table::Blogs, ChangeKind::Insert);

    let notice = tokio::time::timeout(Duration::from_secs(2), notices.recv())
        .await
        .expect("invalidation in time")
        .expect("notice");
    assert_eq!(notice.key, QueryKey::Blogs);

    let body = body_text(h.get("/blog").await).await;
    assert!(body.contains("Written elsewhere"));
}

#[tokio::test]
async fn unknown_message_status_is_refused_without_a_write() {
    let h = harness();
    let read = message("Already handled", MessageStatus::Read);
    let id = read.id;
    h.backend.insert_messages(vec![read]);
    let cookies = h.login().await;

    let response = h
        .post_datastar(
            &format!("/admin/contacts/{id}/status"),
            "status=archived",
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Failed to update message status. Please try again."));
    assert!(!body.contains("Status Updated"));

    assert_eq!(h.backend.write_count(), 0);
    let messages = h.app.messages.read().await;
    assert_eq!(messages.data[0].status, MessageStatus::Read);
}

#[tokio::test]
async fn unknown_post_status_is_refused_without_a_write() {
    let h = harness();
    let live = post("Stays live", PostStatus::Published, false);
    let id = live.id;
    h.backend.insert_posts(vec![live]);
    let cookies = h.login().await;

    let response = h
        .post_datastar(&format!("/admin/blogs/{id}/status"), "status=hidden", &cookies)
        .await;
    let body = body_text(response).await;
    assert!(body.contains("Failed to update blog post. Please try again."));

    assert_eq!(h.backend.write_count(), 0);
    assert!(body_text(h.get("/blog").await).await.contains("Stays live"));
}
