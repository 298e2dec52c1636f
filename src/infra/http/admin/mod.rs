//! Session-gated admin panel.

mod blogs;
mod contacts;
mod dashboard;
mod selectors;
mod shared;

use axum::{
    Router,
    middleware,
    response::Redirect,
    routing::{get, post},
};

use super::{RouterState, middleware::require_session};

pub(super) fn routes(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/admin/dashboard") }))
        .route("/dashboard", get(dashboard::admin_dashboard))
        .route("/dashboard/live", get(dashboard::admin_dashboard_live))
        .route("/blogs", get(blogs::admin_blogs))
        .route("/blogs/live", get(blogs::admin_blogs_live))
        .route(
            "/blogs/new",
            get(blogs::admin_blog_new).post(blogs::admin_blog_create),
        )
        .route(
            "/blogs/{id}/edit",
            get(blogs::admin_blog_edit).post(blogs::admin_blog_update),
        )
        .route("/blogs/{id}/status", post(blogs::admin_blog_status))
        .route("/blogs/{id}/delete", post(blogs::admin_blog_delete))
        .route("/contacts", get(contacts::admin_contacts))
        .route("/contacts/live", get(contacts::admin_contacts_live))
        .route(
            "/contacts/{id}/status",
            post(contacts::admin_contact_status),
        )
        .route(
            "/contacts/{id}/delete",
            post(contacts::admin_contact_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_session))
}
