use axum::{
    Extension,
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use super::{
    selectors::CONTACTS_PANEL,
    shared::{AdminReply, admin_chrome, page_response, parse_id},
};
use crate::application::{
    error::HttpError,
    notify::{self, Notification},
    stream::replace_event,
};
use crate::domain::types::{MessageStatus, Table};
use crate::infra::http::{AdminSession, RouterState, live::live_view};
use crate::presentation::{
    admin::views::{
        AdminContactsPanelTemplate, AdminContactsPanelView, AdminContactsTemplate, AdminSection,
    },
    views::render_fragment,
};

const CONTACTS_PATH: &str = "/admin/contacts";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SelectedQuery {
    selected: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct MessageStatusForm {
    status: String,
    selected: Option<String>,
}

fn contacts_path(selected: Option<Uuid>) -> String {
    match selected {
        Some(id) => format!("{CONTACTS_PATH}?selected={id}"),
        None => CONTACTS_PATH.to_string(),
    }
}

async fn contacts_panel_html(
    state: &RouterState,
    selected: Option<Uuid>,
) -> Result<String, HttpError> {
    let result = state.app.messages.read_settled().await;
    render_fragment(
        &AdminContactsPanelTemplate {
            panel: AdminContactsPanelView::from_result(&result, selected),
        },
        "infra::http::admin::contacts_panel",
    )
}

pub(super) async fn admin_contacts(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
    jar: CookieJar,
    Query(query): Query<SelectedQuery>,
) -> Response {
    let selected = parse_id(query.selected.as_deref());
    let result = state.app.messages.read().await;
    let (jar, chrome) = admin_chrome(jar, &session, AdminSection::Contacts, "Messages");
    page_response(
        jar,
        AdminContactsTemplate {
            chrome,
            panel: AdminContactsPanelView::from_result(&result, selected),
            selected_id: selected.map(|id| id.to_string()).unwrap_or_default(),
        },
        StatusCode::OK,
    )
}

pub(super) async fn admin_contacts_live(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
    Query(query): Query<SelectedQuery>,
) -> Response {
    let selected = parse_id(query.selected.as_deref());
    live_view(
        &state,
        &[Table::ContactMessages],
        Some(session),
        move |app| async move {
            let result = app.messages.read_settled().await;
            let panel = AdminContactsPanelTemplate {
                panel: AdminContactsPanelView::from_result(&result, selected),
            };
            let html = render_fragment(&panel, "infra::http::admin::contacts_live")?;
            Ok(replace_event(CONTACTS_PANEL, html))
        },
    )
}

async fn contacts_panel_reply(
    state: &RouterState,
    reply: AdminReply,
    jar: CookieJar,
    selected: Option<Uuid>,
    notification: Notification,
) -> Response {
    let html = if reply.is_datastar() {
        contacts_panel_html(state, selected).await
    } else {
        Ok(String::new())
    };
    reply.panel(
        jar,
        CONTACTS_PANEL,
        html,
        notification,
        &contacts_path(selected),
    )
}

pub(super) async fn admin_contact_status(
    State(state): State<RouterState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<MessageStatusForm>,
) -> Response {
    let reply = AdminReply::new(&headers, &state.settings);
    let selected = parse_id(form.selected.as_deref());
    let target = parse_id(Some(&id)).zip(MessageStatus::parse(&form.status));
    let notification = match target {
        Some((message_id, status)) => match state
            .app
            .contact_mutations
            .update_status(message_id, status)
            .await
        {
            Ok(updated) => updated.notification,
            Err(err) => err.notification,
        },
        None => notify::contact::status_failed(),
    };
    contacts_panel_reply(&state, reply, jar, selected, notification).await
}

pub(super) async fn admin_contact_delete(
    State(state): State<RouterState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let reply = AdminReply::new(&headers, &state.settings);
    let notification = match parse_id(Some(&id)) {
        Some(message_id) => match state.app.contact_mutations.delete(message_id).await {
            Ok(deleted) => deleted.notification,
            Err(err) => err.notification,
        },
        None => notify::contact::delete_failed(),
    };
    contacts_panel_reply(&state, reply, jar, None, notification).await
}
