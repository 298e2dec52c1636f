use axum::{
    Extension,
    extract::{Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::{
    selectors::{BLOG_EDITOR_PANEL, BLOGS_PANEL},
    shared::{AdminReply, admin_chrome, page_response, parse_id},
};
use crate::application::{
    editor::BlogEditorInput,
    error::HttpError,
    notify::{self, Notification},
    repos::BlogPostPatch,
    stream::replace_event,
};
use crate::domain::types::{PostStatus, Table};
use crate::infra::http::{AdminSession, RouterState, live::live_view, repo_error_to_http};
use crate::presentation::{
    admin::views::{
        AdminBlogEditorPanelTemplate, AdminBlogEditorTemplate, AdminBlogsPanelTemplate,
        AdminBlogsPanelView, AdminBlogsTemplate, AdminSection, BlogEditorView,
    },
    views::render_fragment,
};

const BLOGS_PATH: &str = "/admin/blogs";

fn post_missing() -> Notification {
    Notification::destructive("Error", "Blog post not found.")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct StatusForm {
    status: String,
}

async fn blogs_panel_html(state: &RouterState) -> Result<String, HttpError> {
    let result = state.app.blogs.read_settled().await;
    render_fragment(
        &AdminBlogsPanelTemplate {
            panel: AdminBlogsPanelView::from_result(&result),
        },
        "infra::http::admin::blogs_panel",
    )
}

pub(super) async fn admin_blogs(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
    jar: CookieJar,
) -> Response {
    let result = state.app.blogs.read().await;
    let (jar, chrome) = admin_chrome(jar, &session, AdminSection::Blogs, "Blog Posts");
    page_response(
        jar,
        AdminBlogsTemplate {
            chrome,
            panel: AdminBlogsPanelView::from_result(&result),
        },
        StatusCode::OK,
    )
}

pub(super) async fn admin_blogs_live(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
) -> Response {
    live_view(
        &state,
        &[Table::Blogs],
        Some(session),
        |app| async move {
            let result = app.blogs.read_settled().await;
            let panel = AdminBlogsPanelTemplate {
                panel: AdminBlogsPanelView::from_result(&result),
            };
            let html = render_fragment(&panel, "infra::http::admin::blogs_live")?;
            Ok(replace_event(BLOGS_PANEL, html))
        },
    )
}

fn editor_page(
    jar: CookieJar,
    session: &AdminSession,
    editor: BlogEditorView,
    notifications: &[Notification],
    status: StatusCode,
) -> Response {
    let title = editor.heading;
    let (jar, chrome) = admin_chrome(jar, session, AdminSection::Blogs, title);
    page_response(
        jar,
        AdminBlogEditorTemplate {
            chrome: chrome.with_notifications(notifications),
            editor,
        },
        status,
    )
}

/// Re-show the editor after a failed save, keeping the submitted values.
fn editor_rejected(
    reply: AdminReply,
    jar: CookieJar,
    session: &AdminSession,
    editor: BlogEditorView,
    notification: Notification,
    status: StatusCode,
) -> Response {
    if reply.is_datastar() {
        let html = render_fragment(
            &AdminBlogEditorPanelTemplate { editor },
            "infra::http::admin::blog_editor",
        );
        reply.panel(jar, BLOG_EDITOR_PANEL, html, notification, BLOGS_PATH)
    } else {
        editor_page(jar, session, editor, &[notification], status)
    }
}

pub(super) async fn admin_blog_new(
    Extension(session): Extension<AdminSession>,
    jar: CookieJar,
) -> Response {
    editor_page(
        jar,
        &session,
        BlogEditorView::create(BlogEditorInput::default()),
        &[],
        StatusCode::OK,
    )
}

pub(super) async fn admin_blog_create(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(input): Form<BlogEditorInput>,
) -> Response {
    let reply = AdminReply::new(&headers, &state.settings);
    let post = match input.clone().into_new_post() {
        Ok(post) => post,
        Err(err) => {
            let editor = BlogEditorView::create(input).with_error(err.to_string());
            return editor_rejected(
                reply,
                jar,
                &session,
                editor,
                notify::blog::failed("create"),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    match state.app.blog_mutations.create(post).await {
        Ok(created) => reply.redirect(jar, created.notification, BLOGS_PATH),
        Err(err) => {
            let status =
                repo_error_to_http("infra::http::admin::blog_create", &err.source).status();
            editor_rejected(
                reply,
                jar,
                &session,
                BlogEditorView::create(input),
                err.notification,
                status,
            )
        }
    }
}

pub(super) async fn admin_blog_edit(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let result = state.app.blogs.read_settled().await;
    let found = parse_id(Some(&id))
        .and_then(|id| result.data.iter().find(|post| post.id == id));
    match found {
        Some(post) => {
            let editor =
                BlogEditorView::edit(&post.id.to_string(), BlogEditorInput::from_post(post));
            editor_page(jar, &session, editor, &[], StatusCode::OK)
        }
        None => {
            AdminReply::new(&headers, &state.settings).redirect(jar, post_missing(), BLOGS_PATH)
        }
    }
}

pub(super) async fn admin_blog_update(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(input): Form<BlogEditorInput>,
) -> Response {
    let reply = AdminReply::new(&headers, &state.settings);
    let Some(post_id) = parse_id(Some(&id)) else {
        return reply.redirect(jar, post_missing(), BLOGS_PATH);
    };
    let patch = match input.clone().into_patch() {
        Ok(patch) => patch,
        Err(err) => {
            let editor = BlogEditorView::edit(&id, input).with_error(err.to_string());
            return editor_rejected(
                reply,
                jar,
                &session,
                editor,
                notify::blog::failed("update"),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    match state.app.blog_mutations.update(post_id, patch).await {
        Ok(updated) => reply.redirect(jar, updated.notification, BLOGS_PATH),
        Err(err) if err.is_not_found() => reply.redirect(jar, err.notification, BLOGS_PATH),
        Err(err) => {
            let status =
                repo_error_to_http("infra::http::admin::blog_update", &err.source).status();
            editor_rejected(
                reply,
                jar,
                &session,
                BlogEditorView::edit(&id, input),
                err.notification,
                status,
            )
        }
    }
}

async fn blogs_panel_reply(
    state: &RouterState,
    reply: AdminReply,
    jar: CookieJar,
    notification: Notification,
) -> Response {
    let html = if reply.is_datastar() {
        blogs_panel_html(state).await
    } else {
        Ok(String::new())
    };
    reply.panel(jar, BLOGS_PANEL, html, notification, BLOGS_PATH)
}

pub(super) async fn admin_blog_status(
    State(state): State<RouterState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    let reply = AdminReply::new(&headers, &state.settings);
    let Some(post_id) = parse_id(Some(&id)) else {
        return blogs_panel_reply(&state, reply, jar, post_missing()).await;
    };
    let Some(status) = PostStatus::parse(&form.status) else {
        return blogs_panel_reply(&state, reply, jar, notify::blog::failed("update")).await;
    };

    let notification = match state
        .app
        .blog_mutations
        .update(post_id, BlogPostPatch::status(status))
        .await
    {
        Ok(updated) => updated.notification,
        Err(err) => err.notification,
    };
    blogs_panel_reply(&state, reply, jar, notification).await
}

pub(super) async fn admin_blog_delete(
    State(state): State<RouterState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let reply = AdminReply::new(&headers, &state.settings);
    let notification = match parse_id(Some(&id)) {
        Some(post_id) => match state.app.blog_mutations.delete(post_id).await {
            Ok(deleted) => deleted.notification,
            Err(err) => err.notification,
        },
        None => post_missing(),
    };
    blogs_panel_reply(&state, reply, jar, notification).await
}
