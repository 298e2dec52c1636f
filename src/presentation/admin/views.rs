//! Admin panel view models and templates.

mod blogs;
mod contacts;
mod dashboard;

pub use blogs::{
    AdminBlogEditorPanelTemplate, AdminBlogEditorTemplate, AdminBlogRowView,
    AdminBlogsPanelTemplate, AdminBlogsPanelView, AdminBlogsTemplate, BlogEditorView,
};
pub use contacts::{
    AdminContactsPanelTemplate, AdminContactsPanelView, AdminContactsTemplate,
    AdminMessageRowView, MessageDetailView,
};
pub use dashboard::{
    AdminDashboardPanelTemplate, AdminDashboardTemplate, DashboardPanelView, RecentPostView,
    StatCardView,
};

use crate::application::notify::Notification;
use crate::presentation::views::ToastView;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    Dashboard,
    Blogs,
    Contacts,
}

#[derive(Clone)]
pub struct AdminNavItemView {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

#[derive(Clone)]
pub struct AdminChrome {
    pub title: String,
    pub user_email: String,
    pub navigation: Vec<AdminNavItemView>,
    pub toasts: Vec<ToastView>,
}

impl AdminChrome {
    pub fn new(section: AdminSection, title: &str, user_email: Option<&str>) -> Self {
        let item = |label, href, of| AdminNavItemView {
            label,
            href,
            active: section == of,
        };
        Self {
            title: format!("{title} | AKACorpTech Admin"),
            user_email: user_email.unwrap_or("admin").to_string(),
            navigation: vec![
                item("Dashboard", "/admin/dashboard", AdminSection::Dashboard),
                item("Blog Posts", "/admin/blogs", AdminSection::Blogs),
                item("Messages", "/admin/contacts", AdminSection::Contacts),
            ],
            toasts: Vec::new(),
        }
    }

    pub fn with_notifications(mut self, notifications: &[Notification]) -> Self {
        self.toasts
            .extend(notifications.iter().map(ToastView::from_notification));
        self
    }
}

/// Error line shown above a panel whose collection failed to load.
pub(crate) fn load_error(error: Option<&crate::application::repos::RepoError>, what: &str) -> Option<String> {
    error.map(|_| format!("Error loading {what}. Please try again later."))
}
