use askama::Template;

use crate::application::dashboard::DashboardOverview;
use crate::domain::{blog, entities::BlogPost};

use super::{AdminChrome, load_error};

#[derive(Clone)]
pub struct StatCardView {
    pub label: &'static str,
    pub value: usize,
    pub hint: String,
}

#[derive(Clone)]
pub struct RecentPostView {
    pub title: String,
    pub author: String,
    pub updated: String,
    pub status_label: &'static str,
    pub published: bool,
    pub edit_href: String,
}

impl RecentPostView {
    fn from_post(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            author: post.author.clone(),
            updated: blog::format_date(post.updated_at),
            status_label: post.status.label(),
            published: post.is_published(),
            edit_href: format!("/admin/blogs/{}/edit", post.id),
        }
    }
}

#[derive(Clone)]
pub struct DashboardPanelView {
    pub stats: Vec<StatCardView>,
    pub recent: Vec<RecentPostView>,
    pub error: Option<String>,
}

impl From<&DashboardOverview> for DashboardPanelView {
    fn from(overview: &DashboardOverview) -> Self {
        let stats = overview.stats;
        let error = load_error(overview.posts_error.as_deref(), "blog posts")
            .or_else(|| load_error(overview.messages_error.as_deref(), "messages"));
        Self {
            stats: vec![
                StatCardView {
                    label: "Total Blog Posts",
                    value: stats.total_posts,
                    hint: format!(
                        "{} published, {} drafts",
                        stats.published_posts, stats.draft_posts
                    ),
                },
                StatCardView {
                    label: "Featured Posts",
                    value: stats.featured_posts,
                    hint: "Highlighted on the blog".to_string(),
                },
                StatCardView {
                    label: "Contact Messages",
                    value: stats.total_messages,
                    hint: stats.unread_label(),
                },
            ],
            recent: overview
                .recent_posts
                .iter()
                .map(RecentPostView::from_post)
                .collect(),
            error,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub chrome: AdminChrome,
    pub panel: DashboardPanelView,
}

#[derive(Template)]
#[template(path = "admin/dashboard_panel.html")]
pub struct AdminDashboardPanelTemplate {
    pub panel: DashboardPanelView,
}
