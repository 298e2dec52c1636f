//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::contact::NewContactMessage;
use crate::domain::entities::{BlogPost, ContactMessage};
use crate::domain::types::{MessageStatus, PostStatus};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Full-collection read, newest first.
///
/// Rows are ordered by the entity timestamp descending with nulls first,
/// then by id, so equal store contents always produce the same sequence.
#[async_trait]
pub trait CollectionRepo<T>: Send + Sync {
    async fn list_all(&self) -> Result<Vec<T>, RepoError>;
}

/// Insert payload for a blog post; server-assigned fields are absent.
#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub status: PostStatus,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
}

/// Partial update; `None` leaves a column untouched and `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct BlogPostPatch {
    pub title: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub content: Option<Option<String>>,
    pub author: Option<String>,
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<Option<String>>,
    pub featured: Option<bool>,
    pub status: Option<PostStatus>,
    pub seo_title: Option<Option<String>>,
    pub seo_description: Option<Option<String>>,
    pub seo_keywords: Option<Vec<String>>,
}

impl BlogPostPatch {
    pub fn status(status: PostStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.image_url.is_none()
            && self.featured.is_none()
            && self.status.is_none()
            && self.seo_title.is_none()
            && self.seo_description.is_none()
            && self.seo_keywords.is_none()
    }

    /// Apply the patch to an in-memory post.
    pub fn apply(self, post: &mut BlogPost) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(author) = self.author {
            post.author = author;
        }
        if let Some(category) = self.category {
            post.category = category;
        }
        if let Some(tags) = self.tags {
            post.tags = tags;
        }
        if let Some(image_url) = self.image_url {
            post.image_url = image_url;
        }
        if let Some(featured) = self.featured {
            post.featured = featured;
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        if let Some(seo_title) = self.seo_title {
            post.seo_title = seo_title;
        }
        if let Some(seo_description) = self.seo_description {
            post.seo_description = seo_description;
        }
        if let Some(seo_keywords) = self.seo_keywords {
            post.seo_keywords = seo_keywords;
        }
    }
}

#[async_trait]
pub trait BlogsRepo: CollectionRepo<BlogPost> {
    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPost, RepoError>;

    async fn update_post(&self, id: Uuid, patch: BlogPostPatch) -> Result<BlogPost, RepoError>;

    /// Returns the removed id; a missing row is [`RepoError::NotFound`].
    async fn delete_post(&self, id: Uuid) -> Result<Uuid, RepoError>;
}

#[async_trait]
pub trait ContactMessagesRepo: CollectionRepo<ContactMessage> {
    /// Inserts with `status = unread` and a server-assigned `created_at`.
    async fn create_message(&self, message: NewContactMessage)
    -> Result<ContactMessage, RepoError>;

    async fn update_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<ContactMessage, RepoError>;

    async fn delete_message(&self, id: Uuid) -> Result<Uuid, RepoError>;
}
