//! Login, registration and logout for the admin panel.

use axum::{
    Router,
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::application::{
    auth::{AuthError, AuthState, RegisterForm},
    notify::{self, Notification},
};
use crate::presentation::views::{
    AuthPageView, AuthTemplate, SiteChrome, render_template_response,
};

use super::{RouterState, middleware::LOGIN_PATH, session};

const DASHBOARD_PATH: &str = "/admin/dashboard";

pub(super) fn routes() -> Router<RouterState> {
    Router::new()
        .route(LOGIN_PATH, get(auth_page))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthQuery {
    mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterFields {
    email: String,
    password: String,
    confirm_password: String,
}

fn auth_response(
    jar: CookieJar,
    register: bool,
    email: String,
    notifications: &[Notification],
    status: StatusCode,
) -> Response {
    let title = if register { "Create Account" } else { "Admin Login" };
    let template = AuthTemplate {
        chrome: SiteChrome::new(LOGIN_PATH, title).with_notifications(notifications),
        auth: AuthPageView { register, email },
    };
    (jar, render_template_response(template, status)).into_response()
}

async fn auth_page(
    State(state): State<RouterState>,
    jar: CookieJar,
    Query(query): Query<AuthQuery>,
) -> Response {
    let tokens = session::tokens(&jar);
    if let AuthState::Authenticated { renewed, .. } = state.app.auth.gate(&tokens).await {
        let jar = match renewed {
            Some(renewed) => session::store_session(jar, &renewed, state.settings.secure_cookies),
            None => jar,
        };
        return (jar, Redirect::to(DASHBOARD_PATH)).into_response();
    }

    let (jar, flash) = session::take_flash(jar);
    let register = query.mode.as_deref() == Some("register");
    auth_response(jar, register, String::new(), &flash, StatusCode::OK)
}

async fn login(
    State(state): State<RouterState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.app.auth.login(&form.email, &form.password).await {
        Ok(signed_in) => {
            let secure = state.settings.secure_cookies;
            let jar = session::store_session(jar, &signed_in, secure);
            let jar = session::set_flash(jar, &[notify::auth::welcome()], secure);
            (jar, Redirect::to(DASHBOARD_PATH)).into_response()
        }
        Err(err) => auth_response(
            jar,
            false,
            form.email,
            &[notify::auth::failed(err.user_message())],
            failure_status(&err),
        ),
    }
}

async fn register(
    State(state): State<RouterState>,
    jar: CookieJar,
    Form(form): Form<RegisterFields>,
) -> Response {
    let request = RegisterForm {
        email: form.email,
        password: form.password,
        confirm_password: form.confirm_password,
    };
    match state.app.auth.register(&request).await {
        Ok(()) => auth_response(
            jar,
            false,
            request.email.trim().to_string(),
            &[notify::auth::registered()],
            StatusCode::OK,
        ),
        Err(err) => {
            let status = match &err {
                AuthError::Rejected(_) => StatusCode::BAD_REQUEST,
                other => failure_status(other),
            };
            auth_response(
                jar,
                true,
                request.email,
                &[notify::auth::failed(err.user_message())],
                status,
            )
        }
    }
}

async fn logout(State(state): State<RouterState>, jar: CookieJar) -> Response {
    let secure = state.settings.secure_cookies;
    let Some(access_token) = session::tokens(&jar).access_token else {
        return (session::clear_session(jar), Redirect::to(LOGIN_PATH)).into_response();
    };

    match state.app.auth.logout(&access_token).await {
        Ok(()) => {
            let jar = session::clear_session(jar);
            let jar = session::set_flash(jar, &[notify::auth::signed_out()], secure);
            (jar, Redirect::to(LOGIN_PATH)).into_response()
        }
        Err(err) => {
            let jar = session::set_flash(
                jar,
                &[notify::auth::sign_out_failed(err.user_message())],
                secure,
            );
            (jar, Redirect::to(DASHBOARD_PATH)).into_response()
        }
    }
}

fn failure_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Rejected(_) => StatusCode::UNAUTHORIZED,
        AuthError::PasswordMismatch => StatusCode::BAD_REQUEST,
        AuthError::Unavailable(_) => StatusCode::BAD_GATEWAY,
        AuthError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
    }
}
