//! Typed entities as the rest of the crate sees them, after boundary coercion.

use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use super::{
    text::blank_to_none,
    types::{MessageStatus, PostStatus},
};

#[derive(Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: String,
    pub published_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub status: PostStatus,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: OffsetDateTime,
}

impl ContactMessage {
    pub fn is_unread(&self) -> bool {
        self.status == MessageStatus::Unread
    }
}

/// A `blogs` row as the store returns it: every optional column may be null.
#[derive(Debug, Clone, Default)]
pub struct BlogRecord {
    pub id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: String,
    pub published_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<Vec<String>>,
}

impl From<BlogRecord> for BlogPost {
    fn from(record: BlogRecord) -> Self {
        let status = coerce_post_status(record.id, record.status.as_deref());
        Self {
            id: record.id,
            title: record.title,
            excerpt: blank_to_none(record.excerpt),
            content: blank_to_none(record.content),
            author: record.author,
            published_at: record.published_at,
            updated_at: record.updated_at,
            category: blank_to_none(record.category),
            tags: clean_list(record.tags),
            image_url: blank_to_none(record.image_url),
            featured: record.featured.unwrap_or(false),
            status,
            seo_title: blank_to_none(record.seo_title),
            seo_description: blank_to_none(record.seo_description),
            seo_keywords: clean_list(record.seo_keywords),
        }
    }
}

/// A `contact_messages` row as the store returns it.
#[derive(Debug, Clone)]
pub struct ContactMessageRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<ContactMessageRecord> for ContactMessage {
    fn from(record: ContactMessageRecord) -> Self {
        let status = match record.status.as_deref() {
            Some(raw) => MessageStatus::parse(raw).unwrap_or_else(|| {
                warn!(
                    target = "akasite::domain::entities",
                    message_id = %record.id,
                    status = raw,
                    "unknown contact message status; treating as unread"
                );
                MessageStatus::Unread
            }),
            None => MessageStatus::Unread,
        };

        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            subject: record.subject,
            message: record.message,
            status,
            created_at: record.created_at,
        }
    }
}

// Unknown statuses fall back to draft so they never reach public views.
fn coerce_post_status(id: Uuid, raw: Option<&str>) -> PostStatus {
    match raw {
        Some(value) => PostStatus::parse(value).unwrap_or_else(|| {
            warn!(
                target = "akasite::domain::entities",
                post_id = %id,
                status = value,
                "unknown blog status; treating as draft"
            );
            PostStatus::Draft
        }),
        None => PostStatus::Draft,
    }
}

fn clean_list(items: Option<Vec<String>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| blank_to_none(Some(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> BlogRecord {
        BlogRecord {
            id: Uuid::new_v4(),
            title: "Hello".to_string(),
            author: "Team".to_string(),
            ..BlogRecord::default()
        }
    }

    #[test]
    fn absent_columns_take_documented_defaults() {
        let post = BlogPost::from(record());

        assert_eq!(post.status, PostStatus::Draft);
        assert!(!post.featured);
        assert!(post.tags.is_empty());
        assert!(post.seo_keywords.is_empty());
        assert!(post.excerpt.is_none());
    }

    #[test]
    fn unknown_status_is_never_published() {
        let post = BlogPost::from(BlogRecord {
            status: Some("scheduled".to_string()),
            ..record()
        });

        assert_eq!(post.status, PostStatus::Draft);
        assert!(!post.is_published());
    }

    #[test]
    fn blank_optional_text_is_treated_as_absent() {
        let post = BlogPost::from(BlogRecord {
            excerpt: Some("  ".to_string()),
            category: Some(String::new()),
            tags: Some(vec!["rust".to_string(), " ".to_string()]),
            status: Some("published".to_string()),
            ..record()
        });

        assert!(post.excerpt.is_none());
        assert!(post.category.is_none());
        assert_eq!(post.tags, vec!["rust".to_string()]);
        assert!(post.is_published());
    }

    #[test]
    fn message_status_defaults_to_unread() {
        let message = ContactMessage::from(ContactMessageRecord {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            subject: "Quote".to_string(),
            message: "Hi".to_string(),
            status: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        });

        assert!(message.is_unread());
    }
}
