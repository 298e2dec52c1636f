#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use akasite::{
    application::context::{AppContext, Backend},
    cache::CacheConfig,
    domain::{
        entities::{BlogPost, ContactMessage},
        types::{MessageStatus, PostStatus},
    },
    infra::{
        http::{self, HttpSettings, RouterState},
        memory::MemoryBackend,
    },
};
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, Response, header},
};
use http_body_util::BodyExt;
use time::OffsetDateTime;
use tower::ServiceExt;
use url::Url;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse";

pub struct Harness {
    pub backend: Arc<MemoryBackend>,
    pub app: Arc<AppContext>,
    pub router: Router,
}

pub fn harness() -> Harness {
    harness_with(MemoryBackend::new())
}

pub fn harness_with(backend: MemoryBackend) -> Harness {
    backend.add_user(ADMIN_EMAIL, ADMIN_PASSWORD);
    let backend = Arc::new(backend);
    let public_url = Url::parse("http://localhost:3000/").expect("public url");
    let app = Arc::new(AppContext::new(
        Backend::from_store(Arc::clone(&backend), backend.clone(), backend.clone()),
        CacheConfig::default(),
        &public_url,
    ));
    let settings = HttpSettings {
        secure_cookies: false,
        live_keepalive: Duration::from_secs(15),
        session_recheck: Duration::from_millis(50),
    };
    let router = http::build_router(RouterState::new(Arc::clone(&app), settings));
    Harness {
        backend,
        app,
        router,
    }
}

impl Harness {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).expect("request"))
            .await
    }

    pub async fn get_with_cookies(&self, uri: &str, cookies: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header(header::COOKIE, cookies)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn get_datastar(&self, uri: &str, cookies: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header("datastar-request", "true")
                .header(header::COOKIE, cookies)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookies: Option<&str>) -> Response<Body> {
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookies) = cookies {
            request = request.header(header::COOKIE, cookies);
        }
        self.send(request.body(Body::from(body.to_string())).expect("request"))
            .await
    }

    pub async fn post_datastar(&self, uri: &str, body: &str, cookies: &str) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("datastar-request", "true")
                .header(header::COOKIE, cookies)
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    /// Sign in as the admin and return a `Cookie` header value for the session.
    pub async fn login(&self) -> String {
        let response = self
            .post_form(
                "/auth/login",
                "email=admin%40example.com&password=correct+horse",
                None,
            )
            .await;
        assert_eq!(response.status(), 303, "login should redirect");
        cookie_header(response.headers())
    }
}

/// Collapse `Set-Cookie` headers into a `Cookie` request header, skipping removals.
pub fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .filter(|pair| !pair.ends_with('='))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split("; ")
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Read SSE frames until the accumulated text contains `needle` or `wait` elapses.
pub async fn read_until(body: &mut Body, needle: &str, wait: Duration) -> Option<String> {
    let deadline = tokio::time::Instant::now() + wait;
    let mut seen = String::new();
    loop {
        let frame = tokio::time::timeout_at(deadline, body.frame()).await.ok()??;
        let Ok(frame) = frame else {
            return None;
        };
        if let Some(data) = frame.data_ref() {
            seen.push_str(&String::from_utf8_lossy(data));
            if seen.contains(needle) {
                return Some(seen);
            }
        }
    }
}

pub fn post(title: &str, status: PostStatus, featured: bool) -> BlogPost {
    let published_at = (status == PostStatus::Published).then(OffsetDateTime::now_utc);
    BlogPost {
        id: Uuid::new_v4(),
        title: title.to_string(),
        excerpt: Some(format!("{title} excerpt")),
        content: Some(format!("{title} body")),
        author: "AKACorpTech".to_string(),
        published_at,
        updated_at: published_at,
        category: Some("Engineering".to_string()),
        tags: vec!["rust".to_string()],
        image_url: None,
        featured,
        status,
        seo_title: None,
        seo_description: None,
        seo_keywords: Vec::new(),
    }
}

pub fn message(subject: &str, status: MessageStatus) -> ContactMessage {
    ContactMessage {
        id: Uuid::new_v4(),
        name: "Asha".to_string(),
        email: "asha@example.com".to_string(),
        subject: subject.to_string(),
        message: "Hello there".to_string(),
        status,
        created_at: OffsetDateTime::now_utc(),
    }
}
