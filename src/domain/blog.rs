//! Rules for presenting blog posts to the public.

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use uuid::Uuid;

use super::entities::BlogPost;

pub const NO_DATE: &str = "No date";
pub const NO_EXCERPT: &str = "No excerpt available";
pub const NO_CONTENT: &str = "No content available.";
pub const DEFAULT_CATEGORY: &str = "General";
pub const CARD_TAG_LIMIT: usize = 3;
const WORDS_PER_MINUTE: usize = 200;

const DISPLAY_DATE: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Published posts split the way the blog index shows them.
#[derive(Debug)]
pub struct BlogListing<'a> {
    pub featured: Vec<&'a BlogPost>,
    pub regular: Vec<&'a BlogPost>,
}

impl BlogListing<'_> {
    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.regular.is_empty()
    }
}

/// Keep only posts whose status is `published`, preserving order.
pub fn published(posts: &[BlogPost]) -> Vec<&BlogPost> {
    posts.iter().filter(|post| post.is_published()).collect()
}

pub fn listing(posts: &[BlogPost]) -> BlogListing<'_> {
    let (featured, regular) = published(posts)
        .into_iter()
        .partition(|post| post.featured);
    BlogListing { featured, regular }
}

/// Outcome of resolving a `/blog/{id}` request against the cached collection.
#[derive(Debug)]
pub enum BlogLookup<'a> {
    NotFound,
    Unpublished,
    Published(&'a BlogPost),
}

pub fn lookup<'a>(posts: &'a [BlogPost], raw_id: &str) -> BlogLookup<'a> {
    let Ok(id) = Uuid::parse_str(raw_id.trim()) else {
        return BlogLookup::NotFound;
    };
    match posts.iter().find(|post| post.id == id) {
        None => BlogLookup::NotFound,
        Some(post) if !post.is_published() => BlogLookup::Unpublished,
        Some(post) => BlogLookup::Published(post),
    }
}

/// Estimated reading time in whole minutes, never less than one.
pub fn read_time_minutes(content: Option<&str>) -> usize {
    let words = content.map_or(0, |text| text.split_whitespace().count());
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

pub fn read_time_label(content: Option<&str>) -> String {
    format!("{} min read", read_time_minutes(content))
}

pub fn format_date(value: Option<OffsetDateTime>) -> String {
    value
        .and_then(|date| date.format(DISPLAY_DATE).ok())
        .unwrap_or_else(|| NO_DATE.to_string())
}

/// Content split into display paragraphs on line breaks; blank lines are dropped.
pub fn paragraphs(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn card_tags(tags: &[String]) -> &[String] {
    &tags[..tags.len().min(CARD_TAG_LIMIT)]
}
