use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::{
    auth::{AuthState, AuthUser},
    error::ErrorReport,
    stream::PatchBatch,
};

use super::{RouterState, is_datastar, session};

pub const LOGIN_PATH: &str = "/auth";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// The signed-in admin, inserted by [`require_session`].
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user: AuthUser,
    pub access_token: String,
    /// The browser holds a refresh cookie, so an expired access token can
    /// still be renewed by reloading the page.
    pub renewable: bool,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "akasite::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "akasite::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "client request error",
            );
        }
    }

    response
}

/// Gate for `/admin`: admits a live or refreshable session, otherwise sends
/// the visitor to the login page.
pub async fn require_session(
    State(state): State<RouterState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let tokens = session::tokens(&jar);
    let renewable = tokens.refresh_token.is_some();
    match state.app.auth.gate(&tokens).await {
        AuthState::Authenticated { user, renewed } => {
            let (jar, access_token) = match renewed {
                Some(renewed) => {
                    debug!(
                        target = "akasite::http::session",
                        user_id = %user.id,
                        "session renewed by refresh token"
                    );
                    let jar =
                        session::store_session(jar, &renewed, state.settings.secure_cookies);
                    (jar, renewed.access_token)
                }
                None => (jar, tokens.access_token.unwrap_or_default()),
            };
            request
                .extensions_mut()
                .insert(AdminSession {
                    user,
                    access_token,
                    renewable,
                });
            let response = next.run(request).await;
            (jar, response).into_response()
        }
        AuthState::Unauthenticated | AuthState::Checking => {
            debug!(
                target = "akasite::http::session",
                path = %request.uri().path(),
                "no admin session; redirecting to login"
            );
            let jar = session::clear_session(jar);
            if is_datastar(request.headers()) {
                let mut batch = PatchBatch::new();
                batch.redirect(LOGIN_PATH);
                (jar, batch.into_response()).into_response()
            } else {
                (jar, Redirect::to(LOGIN_PATH)).into_response()
            }
        }
    }
}
