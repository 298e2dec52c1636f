use askama::Template;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use uuid::Uuid;

use crate::application::query::QueryResult;
use crate::domain::{blog, contact, entities::ContactMessage};

use super::{AdminChrome, load_error};

const RECEIVED_AT: &[FormatItem<'static>] = format_description!(
    "[month repr:short] [day padding:none], [year] [hour repr:12 padding:none]:[minute] [period]"
);
const PREVIEW_CHARS: usize = 80;

fn received_at(value: OffsetDateTime) -> String {
    value
        .format(RECEIVED_AT)
        .unwrap_or_else(|_| blog::format_date(Some(value)))
}

fn preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[derive(Clone)]
pub struct AdminMessageRowView {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub preview: String,
    pub received: String,
    pub unread: bool,
    pub selected: bool,
    pub select_href: String,
}

#[derive(Clone)]
pub struct MessageDetailView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub paragraphs: Vec<String>,
    pub received: String,
    pub unread: bool,
    pub toggle_label: &'static str,
    pub next_status: &'static str,
    pub reply_href: String,
    pub status_action: String,
    pub delete_action: String,
}

impl MessageDetailView {
    fn from_message(message: &ContactMessage) -> Self {
        let id = message.id.to_string();
        let unread = message.is_unread();
        Self {
            name: message.name.clone(),
            email: message.email.clone(),
            subject: message.subject.clone(),
            paragraphs: blog::paragraphs(&message.message),
            received: received_at(message.created_at),
            unread,
            toggle_label: if unread { "Mark as Read" } else { "Mark as Unread" },
            next_status: if unread { "read" } else { "unread" },
            reply_href: contact::reply_href(&message.email, &message.subject),
            status_action: format!("/admin/contacts/{id}/status"),
            delete_action: format!("/admin/contacts/{id}/delete"),
            id,
        }
    }
}

#[derive(Clone)]
pub struct AdminContactsPanelView {
    pub rows: Vec<AdminMessageRowView>,
    pub selected: Option<MessageDetailView>,
    pub total: usize,
    pub unread: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl AdminContactsPanelView {
    /// `selected` that no longer exists (for example after a delete) shows no detail pane.
    pub fn from_result(result: &QueryResult<ContactMessage>, selected: Option<Uuid>) -> Self {
        let rows = result
            .data
            .iter()
            .map(|message| AdminMessageRowView {
                name: message.name.clone(),
                email: message.email.clone(),
                subject: message.subject.clone(),
                preview: preview(&message.message),
                received: received_at(message.created_at),
                unread: message.is_unread(),
                selected: Some(message.id) == selected,
                select_href: format!("/admin/contacts?selected={}", message.id),
            })
            .collect();
        let detail = selected.and_then(|id| {
            result
                .data
                .iter()
                .find(|message| message.id == id)
                .map(MessageDetailView::from_message)
        });

        Self {
            rows,
            selected: detail,
            total: result.data.len(),
            unread: result.data.iter().filter(|message| message.is_unread()).count(),
            loading: result.is_loading,
            error: load_error(result.error.as_deref(), "messages"),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/contacts.html")]
pub struct AdminContactsTemplate {
    pub chrome: AdminChrome,
    pub panel: AdminContactsPanelView,
    pub selected_id: String,
}

#[derive(Template)]
#[template(path = "admin/contacts_panel.html")]
pub struct AdminContactsPanelTemplate {
    pub panel: AdminContactsPanelView,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::types::MessageStatus;

    fn message(status: MessageStatus) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            subject: "Quote".into(),
            message: "x".repeat(100),
            status,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn panel_counts_and_selects() {
        let unread = message(MessageStatus::Unread);
        let read = message(MessageStatus::Read);
        let result = QueryResult {
            data: Arc::new(vec![unread.clone(), read]),
            is_loading: false,
            error: None,
        };

        let panel = AdminContactsPanelView::from_result(&result, Some(unread.id));
        assert_eq!(panel.total, 2);
        assert_eq!(panel.unread, 1);
        let detail = panel.selected.expect("selected message");
        assert_eq!(detail.toggle_label, "Mark as Read");
        assert_eq!(detail.reply_href, "mailto:asha@example.com?subject=Re%3A%20Quote");
        assert!(panel.rows[0].selected);
        assert!(panel.rows[0].preview.ends_with('…'));
    }

    #[test]
    fn missing_selection_shows_no_detail() {
        let result = QueryResult {
            data: Arc::new(vec![message(MessageStatus::Read)]),
            is_loading: false,
            error: None,
        };
        let panel = AdminContactsPanelView::from_result(&result, Some(Uuid::new_v4()));
        assert!(panel.selected.is_none());
    }
}
