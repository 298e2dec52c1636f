mod admin;
mod auth;
mod live;
mod middleware;
mod public;
mod session;

pub use middleware::AdminSession;
pub use session::{FLASH_COOKIE, REFRESH_COOKIE, SESSION_COOKIE};

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderMap, StatusCode},
    middleware as axum_middleware,
    routing::get,
};

use crate::application::{context::AppContext, error::HttpError, repos::RepoError};
use crate::config::Settings;
use crate::infra::assets;

use self::middleware::{log_responses, set_request_context};

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

/// Request-independent knobs the handlers need.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub secure_cookies: bool,
    pub live_keepalive: Duration,
    pub session_recheck: Duration,
}

impl HttpSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            secure_cookies: settings.server.secure_cookies,
            live_keepalive: settings.live.keepalive,
            session_recheck: settings.auth.session_recheck,
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app: Arc<AppContext>,
    pub settings: HttpSettings,
}

impl RouterState {
    pub fn new(app: Arc<AppContext>, settings: HttpSettings) -> Self {
        Self { app, settings }
    }
}

pub fn build_router(state: RouterState) -> Router {
    Router::new()
        .merge(public::routes())
        .merge(auth::routes())
        .nest("/admin", admin::routes(state.clone()))
        .route("/static/{*path}", get(assets::serve_static))
        .fallback(public::not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

fn is_datastar(headers: &HeaderMap) -> bool {
    headers.contains_key(DATASTAR_REQUEST_HEADER)
}

fn repo_error_status(err: &RepoError) -> (StatusCode, &'static str) {
    match err {
        RepoError::Duplicate { .. } => (StatusCode::CONFLICT, "Duplicate record"),
        RepoError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
        RepoError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "Invalid input"),
        RepoError::Integrity { .. } => (StatusCode::CONFLICT, "Integrity constraint violated"),
        RepoError::Timeout => (StatusCode::SERVICE_UNAVAILABLE, "Database timeout"),
        RepoError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Persistence error"),
    }
}

/// Map a repository error to a consistent HTTP error for admin and public surfaces.
pub fn repo_error_to_http(source: &'static str, err: &RepoError) -> HttpError {
    let (status, public_message) = repo_error_status(err);
    HttpError::from_error(source, status, public_message, err)
}
