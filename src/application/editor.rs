//! Admin blog editor input: parsing, validation and pre-filling.

use serde::Deserialize;

use crate::domain::{
    entities::BlogPost,
    error::DomainError,
    text::{blank_to_none, join_list, split_list},
    types::PostStatus,
};

use super::repos::{BlogPostPatch, NewBlogPost};

/// Blog editor fields exactly as the form submits them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlogEditorInput {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: String,
    /// Comma separated.
    pub tags: String,
    pub image_url: String,
    /// Checkbox; present (any value) when ticked.
    pub featured: Option<String>,
    pub status: String,
    pub seo_title: String,
    pub seo_description: String,
    /// Comma separated.
    pub seo_keywords: String,
}

/// Validated editor content, shared by create and full-form update.
#[derive(Debug, Clone, PartialEq)]
struct EditorFields {
    title: String,
    excerpt: Option<String>,
    content: Option<String>,
    author: String,
    category: Option<String>,
    tags: Vec<String>,
    image_url: Option<String>,
    featured: bool,
    status: PostStatus,
    seo_title: Option<String>,
    seo_description: Option<String>,
    seo_keywords: Vec<String>,
}

impl BlogEditorInput {
    pub fn from_post(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            content: post.content.clone().unwrap_or_default(),
            author: post.author.clone(),
            category: post.category.clone().unwrap_or_default(),
            tags: join_list(&post.tags),
            image_url: post.image_url.clone().unwrap_or_default(),
            featured: post.featured.then(|| "on".to_string()),
            status: post.status.as_str().to_string(),
            seo_title: post.seo_title.clone().unwrap_or_default(),
            seo_description: post.seo_description.clone().unwrap_or_default(),
            seo_keywords: join_list(&post.seo_keywords),
        }
    }

    pub fn is_featured(&self) -> bool {
        self.featured.is_some()
    }

    pub fn is_published(&self) -> bool {
        PostStatus::parse(&self.status) == Some(PostStatus::Published)
    }

    pub fn into_new_post(&self) -> Result<NewBlogPost, DomainError> {
        let fields = self.validate()?;
        Ok(NewBlogPost {
            title: fields.title,
            excerpt: fields.excerpt,
            content: fields.content,
            author: fields.author,
            category: fields.category,
            tags: fields.tags,
            image_url: fields.image_url,
            featured: fields.featured,
            status: fields.status,
            seo_title: fields.seo_title,
            seo_description: fields.seo_description,
            seo_keywords: fields.seo_keywords,
        })
    }

    /// Every editable column, as the full editor form overwrites them all.
    pub fn into_patch(&self) -> Result<BlogPostPatch, DomainError> {
        let fields = self.validate()?;
        Ok(BlogPostPatch {
            title: Some(fields.title),
            excerpt: Some(fields.excerpt),
            content: Some(fields.content),
            author: Some(fields.author),
            category: Some(fields.category),
            tags: Some(fields.tags),
            image_url: Some(fields.image_url),
            featured: Some(fields.featured),
            status: Some(fields.status),
            seo_title: Some(fields.seo_title),
            seo_description: Some(fields.seo_description),
            seo_keywords: Some(fields.seo_keywords),
        })
    }

    fn validate(&self) -> Result<EditorFields, DomainError> {
        let title = required("title", &self.title)?;
        let author = required("author", &self.author)?;
        let status = match self.status.trim() {
            "" => PostStatus::Draft,
            raw => PostStatus::parse(raw)
                .ok_or_else(|| DomainError::invalid("status", "must be draft or published"))?,
        };

        Ok(EditorFields {
            title,
            excerpt: optional(&self.excerpt),
            content: optional(&self.content),
            author,
            category: optional(&self.category),
            tags: split_list(&self.tags),
            image_url: optional(&self.image_url),
            featured: self.is_featured(),
            status,
            seo_title: optional(&self.seo_title),
            seo_description: optional(&self.seo_description),
            seo_keywords: split_list(&self.seo_keywords),
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, DomainError> {
    blank_to_none(Some(value.to_string())).ok_or(DomainError::missing(field))
}

fn optional(value: &str) -> Option<String> {
    blank_to_none(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BlogEditorInput {
        BlogEditorInput {
            title: " Launch notes ".into(),
            author: "Team".into(),
            tags: "rust, web, ".into(),
            status: "published".into(),
            featured: Some("on".into()),
            ..BlogEditorInput::default()
        }
    }

    #[test]
    fn new_post_trims_and_splits_lists() {
        let post = input().into_new_post().expect("valid input");
        assert_eq!(post.title, "Launch notes");
        assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
        assert!(post.featured);
        assert_eq!(post.status, PostStatus::Published);
        assert!(post.excerpt.is_none());
    }

    #[test]
    fn title_and_author_are_required() {
        let mut missing_title = input();
        missing_title.title = "  ".into();
        assert_eq!(
            missing_title.into_new_post().expect_err("no title"),
            DomainError::missing("title")
        );

        let mut missing_author = input();
        missing_author.author.clear();
        assert_eq!(
            missing_author.into_new_post().expect_err("no author").field(),
            Some("author")
        );
    }

    #[test]
    fn blank_status_defaults_to_draft_and_unknown_is_rejected() {
        let mut blank = input();
        blank.status.clear();
        assert_eq!(blank.into_new_post().expect("draft").status, PostStatus::Draft);

        let mut unknown = input();
        unknown.status = "archived".into();
        assert!(unknown.into_new_post().is_err());
    }

    #[test]
    fn patch_clears_blank_optional_columns() {
        let patch = input().into_patch().expect("patch");
        assert_eq!(patch.excerpt, Some(None));
        assert_eq!(patch.featured, Some(true));
    }
}
