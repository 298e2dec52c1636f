use askama::Template;

use crate::application::{editor::BlogEditorInput, query::QueryResult};
use crate::domain::{blog, entities::BlogPost};

use super::{AdminChrome, load_error};

#[derive(Clone)]
pub struct AdminBlogRowView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub date: String,
    pub category: String,
    pub status_label: &'static str,
    pub published: bool,
    pub featured: bool,
    pub toggle_label: &'static str,
    pub next_status: &'static str,
    pub edit_href: String,
    pub status_action: String,
    pub delete_action: String,
}

impl AdminBlogRowView {
    fn from_post(post: &BlogPost) -> Self {
        let id = post.id.to_string();
        Self {
            title: post.title.clone(),
            author: post.author.clone(),
            date: blog::format_date(post.published_at.or(post.updated_at)),
            category: post
                .category
                .clone()
                .unwrap_or_else(|| blog::DEFAULT_CATEGORY.to_string()),
            status_label: post.status.label(),
            published: post.is_published(),
            featured: post.featured,
            toggle_label: if post.is_published() {
                "Unpublish"
            } else {
                "Publish"
            },
            next_status: post.status.toggled().as_str(),
            edit_href: format!("/admin/blogs/{id}/edit"),
            status_action: format!("/admin/blogs/{id}/status"),
            delete_action: format!("/admin/blogs/{id}/delete"),
            id,
        }
    }
}

#[derive(Clone)]
pub struct AdminBlogsPanelView {
    pub rows: Vec<AdminBlogRowView>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AdminBlogsPanelView {
    pub fn from_result(result: &QueryResult<BlogPost>) -> Self {
        Self {
            rows: result.data.iter().map(AdminBlogRowView::from_post).collect(),
            loading: result.is_loading,
            error: load_error(result.error.as_deref(), "blog posts"),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/blogs.html")]
pub struct AdminBlogsTemplate {
    pub chrome: AdminChrome,
    pub panel: AdminBlogsPanelView,
}

#[derive(Template)]
#[template(path = "admin/blogs_panel.html")]
pub struct AdminBlogsPanelTemplate {
    pub panel: AdminBlogsPanelView,
}

#[derive(Clone)]
pub struct BlogEditorView {
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub input: BlogEditorInput,
    pub featured: bool,
    pub published: bool,
    pub error: Option<String>,
}

impl BlogEditorView {
    pub fn create(input: BlogEditorInput) -> Self {
        Self {
            heading: "Create New Blog Post",
            action: "/admin/blogs/new".to_string(),
            submit_label: "Create Post",
            featured: input.is_featured(),
            published: input.is_published(),
            input,
            error: None,
        }
    }

    pub fn edit(id: &str, input: BlogEditorInput) -> Self {
        Self {
            heading: "Edit Blog Post",
            action: format!("/admin/blogs/{id}/edit"),
            submit_label: "Update Post",
            featured: input.is_featured(),
            published: input.is_published(),
            input,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[derive(Template)]
#[template(path = "admin/blog_editor.html")]
pub struct AdminBlogEditorTemplate {
    pub chrome: AdminChrome,
    pub editor: BlogEditorView,
}

#[derive(Template)]
#[template(path = "admin/blog_editor_panel.html")]
pub struct AdminBlogEditorPanelTemplate {
    pub editor: BlogEditorView,
}
