mod common;

use std::time::Duration;

use akasite::application::repos::NewBlogPost;
use akasite::domain::types::{PostStatus, Table};
use akasite::infra::http::SESSION_COOKIE;
use axum::http::{StatusCode, header};

use common::{cookie_header, cookie_value, harness, read_until};

const WAIT: Duration = Duration::from_secs(2);

fn new_post(title: &str) -> NewBlogPost {
    NewBlogPost {
        title: title.to_string(),
        excerpt: None,
        content: Some("Body".to_string()),
        author: "Team".to_string(),
        category: None,
        tags: Vec::new(),
        image_url: None,
        featured: false,
        status: PostStatus::Published,
        seo_title: None,
        seo_description: None,
        seo_keywords: Vec::new(),
    }
}

#[tokio::test]
async fn blog_live_pushes_new_posts() {
    let h = harness();
    let response = h.get_datastar("/blog/live", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let mut body = response.into_body();
    let first = read_until(&mut body, "data-blog-panel", WAIT)
        .await
        .expect("initial panel");
    assert!(first.contains("No published articles yet"));
    assert_eq!(h.app.realtime.mount_count(Table::Blogs), 1);

    h.app
        .blog_mutations
        .create(new_post("Pushed live"))
        .await
        .expect("create");

    let update = read_until(&mut body, "Pushed live", WAIT).await;
    assert!(update.is_some(), "live view re-rendered after the write");
}

#[tokio::test]
async fn closing_the_stream_unmounts_the_feed() {
    let h = harness();
    let response = h.get_datastar("/blog/live", "").await;
    let mut body = response.into_body();
    read_until(&mut body, "data-blog-panel", WAIT)
        .await
        .expect("initial panel");
    assert_eq!(h.app.realtime.mount_count(Table::Blogs), 1);

    drop(body);
    assert_eq!(h.app.realtime.mount_count(Table::Blogs), 0);
}

#[tokio::test]
async fn admin_live_view_redirects_once_the_session_ends() {
    let h = harness();
    let cookies = h.login().await;
    let access = cookie_value(&cookies, SESSION_COOKIE).expect("access token");
    let access_only = format!("{SESSION_COOKIE}={access}");

    let response = h.get_datastar("/admin/dashboard/live", &access_only).await;
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = response.into_body();
    read_until(&mut body, "data-admin-panel=\"dashboard\"", WAIT)
        .await
        .expect("initial dashboard");

    h.backend.revoke(&access);

    let redirect = read_until(&mut body, "window.location.assign", WAIT).await;
    let redirect = redirect.expect("redirect after revocation");
    assert!(redirect.contains("/auth"));
}

#[tokio::test]
async fn expired_access_token_reloads_the_page_for_renewal() {
    let h = harness();
    let cookies = h.login().await;
    let access = cookie_value(&cookies, SESSION_COOKIE).expect("access token");

    let response = h.get_datastar("/admin/blogs/live", &cookies).await;
    let mut body = response.into_body();
    read_until(&mut body, "data-admin-panel=\"blogs\"", WAIT)
        .await
        .expect("initial blogs panel");

    h.backend.expire_access(&access);

    let reload = read_until(&mut body, "window.location.reload", WAIT).await;
    let reload = reload.expect("reload after expiry");
    assert!(!reload.contains("window.location.assign"));

    // The reload goes through the gate, which renews from the refresh cookie.
    let response = h.get_with_cookies("/admin/blogs", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
    let renewed = cookie_header(response.headers());
    assert_ne!(cookie_value(&renewed, SESSION_COOKIE), Some(access));
}
