mod common;

use akasite::domain::types::{MessageStatus, PostStatus};
use axum::http::{StatusCode, header};
use uuid::Uuid;

use common::{body_text, harness, post};

#[tokio::test]
async fn marketing_pages_render() {
    let h = harness();
    for (path, needle) in [
        ("/", "AKACorpTech"),
        ("/about", "Years Experience"),
        ("/services", "Custom Software Development"),
        ("/portfolio", "Stock Strategix"),
        ("/contact", "Get In Touch"),
    ] {
        let response = h.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let body = body_text(response).await;
        assert!(body.contains(needle), "{path} should mention {needle}");
    }
}

#[tokio::test]
async fn service_pages_resolve_known_slugs_only() {
    let h = harness();
    for slug in [
        "custom-software",
        "web-development",
        "mobile-apps",
        "cloud-devops",
        "cybersecurity",
        "digital-marketing",
        "emerging-tech",
    ] {
        let response = h.get(&format!("/services/{slug}")).await;
        assert_eq!(response.status(), StatusCode::OK, "{slug}");
    }

    let response = h.get("/services/quantum-computing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blog_index_lists_only_published_posts() {
    let h = harness();
    h.backend.insert_posts(vec![
        post("Shipping Rust services", PostStatus::Published, true),
        post("Cloud cost playbook", PostStatus::Published, false),
        post("Unfinished thoughts", PostStatus::Draft, false),
    ]);

    let response = h.get("/blog").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    assert!(body.contains("Shipping Rust services"));
    assert!(body.contains("Cloud cost playbook"));
    assert!(body.contains("Featured Articles"));
    assert!(!body.contains("Unfinished thoughts"));
}

#[tokio::test]
async fn empty_blog_shows_placeholder() {
    let h = harness();
    let body = body_text(h.get("/blog").await).await;
    assert!(body.contains("No published articles yet. Check back soon!"));
}

#[tokio::test]
async fn blog_detail_distinguishes_missing_and_unpublished() {
    let h = harness();
    let live = post("Live article", PostStatus::Published, false);
    let draft = post("Secret draft", PostStatus::Draft, false);
    let (live_id, draft_id) = (live.id, draft.id);
    h.backend.insert_posts(vec![live, draft]);

    let response = h.get(&format!("/blog/{live_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Live article"));
    assert!(body.contains("Back to Blog"));

    let response = h.get(&format!("/blog/{draft_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_text(response).await;
    assert!(body.contains("This article is not yet published"));
    assert!(!body.contains("Secret draft body"));

    let response = h.get(&format!("/blog/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Article not found"));

    let response = h.get("/blog/not-an-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blog_read_failure_without_cache_shows_error() {
    let h = harness();
    h.backend.set_read_failure(true);

    let response = h.get("/blog").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_text(response).await;
    assert!(body.contains("Error loading blog posts"));
    assert!(body.contains("Please try again later"));
}

#[tokio::test]
async fn blog_read_failure_with_cache_keeps_showing_posts() {
    let h = harness();
    h.backend
        .insert_posts(vec![post("Cached article", PostStatus::Published, false)]);
    assert_eq!(h.get("/blog").await.status(), StatusCode::OK);

    h.backend.set_read_failure(true);
    h.app.blogs.refetch().await;

    let response = h.get("/blog").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Cached article"));
    assert!(body.contains("please try again later"));
}

#[tokio::test]
async fn contact_with_empty_subject_never_reaches_the_store() {
    let h = harness();
    let response = h
        .post_form(
            "/contact",
            "name=Asha&email=asha%40example.com&subject=+&message=Hi",
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("Please fill in the subject field."));
    assert!(body.contains("value=\"Asha\""), "values are kept");
    assert_eq!(h.backend.write_count(), 0);
}

#[tokio::test]
async fn contact_submission_is_stored_unread() {
    let h = harness();
    let response = h
        .post_form(
            "/contact",
            "name=Asha&email=asha%40example.com&subject=New+site&message=We+need+a+site",
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Message Sent!"));
    assert!(!body.contains("value=\"Asha\""), "form is reset");

    let messages = h.app.messages.read().await;
    assert_eq!(messages.data.len(), 1);
    let stored = &messages.data[0];
    assert_eq!(stored.subject, "New site");
    assert_eq!(stored.status, MessageStatus::Unread);
}

#[tokio::test]
async fn unknown_paths_render_the_not_found_page() {
    let h = harness();
    let response = h.get("/definitely/not/here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_text(response).await;
    assert!(body.contains("Oops! Page not found"));
    assert!(body.contains("Return to Home"));
}

#[tokio::test]
async fn robots_and_static_assets_are_served() {
    let h = harness();

    let response = h.get("/robots.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Disallow: /admin"));

    let response = h.get("/static/css/site.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/css"));

    let response = h.get("/static/../Cargo.toml").await;
    assert_ne!(response.status(), StatusCode::OK);
}
