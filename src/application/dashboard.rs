//! Admin dashboard figures derived from the cached collections.

use std::sync::Arc;

use crate::domain::entities::{BlogPost, ContactMessage};

use super::query::{QueryResult, QueryService};
use super::repos::RepoError;

pub const RECENT_POST_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_posts: usize,
    pub published_posts: usize,
    pub draft_posts: usize,
    pub featured_posts: usize,
    pub total_messages: usize,
    pub unread_messages: usize,
}

impl DashboardStats {
    pub fn from_collections(posts: &[BlogPost], messages: &[ContactMessage]) -> Self {
        let published_posts = posts.iter().filter(|post| post.is_published()).count();
        Self {
            total_posts: posts.len(),
            published_posts,
            draft_posts: posts.len() - published_posts,
            featured_posts: posts.iter().filter(|post| post.featured).count(),
            total_messages: messages.len(),
            unread_messages: messages.iter().filter(|msg| msg.is_unread()).count(),
        }
    }

    pub fn unread_label(&self) -> String {
        if self.unread_messages > 0 {
            format!("{} unread", self.unread_messages)
        } else {
            "All read".to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub recent_posts: Vec<BlogPost>,
    pub posts_error: Option<Arc<RepoError>>,
    pub messages_error: Option<Arc<RepoError>>,
}

impl DashboardOverview {
    pub fn from_results(posts: &QueryResult<BlogPost>, messages: &QueryResult<ContactMessage>) -> Self {
        Self {
            stats: DashboardStats::from_collections(&posts.data, &messages.data),
            recent_posts: posts.data.iter().take(RECENT_POST_LIMIT).cloned().collect(),
            posts_error: posts.error.clone(),
            messages_error: messages.error.clone(),
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    blogs: QueryService<BlogPost>,
    messages: QueryService<ContactMessage>,
}

impl DashboardService {
    pub fn new(blogs: QueryService<BlogPost>, messages: QueryService<ContactMessage>) -> Self {
        Self { blogs, messages }
    }

    pub async fn overview(&self) -> DashboardOverview {
        let (posts, messages) = tokio::join!(self.blogs.read_settled(), self.messages.read_settled());
        DashboardOverview::from_results(&posts, &messages)
    }
}
