use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::{
    error::{ErrorReport, HttpError},
    notify::Notification,
    query::QueryResult,
};
use crate::domain::{
    blog::{self, BlogLookup},
    contact::{self, ContactDraft},
    entities::BlogPost,
    site::{self, Company, Link, Project, SERVICES, Service, Stat},
};

const TOAST_TTL_MS: u64 = 6000;
const PLACEHOLDER_IMAGE: &str = "/static/img/placeholder.svg";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

/// Render a template to a string, for SSE patches.
pub fn render_fragment<T: Template>(template: &T, source: &'static str) -> Result<String, HttpError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(source, "Template rendering failed", err).into())
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    render_fragment(&template, "presentation::views::render_template").map(Html)
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: SiteChrome, page: NotFoundView) -> Response {
    let mut response =
        render_template_response(NotFoundTemplate { chrome, page }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavLinkView {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Clone)]
pub struct ToastView {
    pub id: String,
    pub kind: &'static str,
    pub title: String,
    pub description: String,
    pub ttl_ms: u64,
}

impl ToastView {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: if notification.is_destructive() {
                "error"
            } else {
                "success"
            },
            title: notification.title.clone(),
            description: notification.description.clone(),
            ttl_ms: TOAST_TTL_MS,
        }
    }
}

#[derive(Template)]
#[template(path = "partials/toast_stack.html")]
pub struct ToastStackTemplate {
    pub toasts: Vec<ToastView>,
}

impl ToastStackTemplate {
    pub fn from_notifications(notifications: &[Notification]) -> Self {
        Self {
            toasts: notifications.iter().map(ToastView::from_notification).collect(),
        }
    }
}

/// Header, navigation and footer shared by every public page.
#[derive(Clone)]
pub struct SiteChrome {
    pub title: String,
    pub description: String,
    pub nav: Vec<NavLinkView>,
    pub service_links: Vec<NavLinkView>,
    pub company: &'static Company,
    pub social: &'static [Link],
    pub quick_links: &'static [Link],
    pub year: i32,
    pub toasts: Vec<ToastView>,
}

impl SiteChrome {
    pub fn new(path: &str, page_title: &str) -> Self {
        let nav = site::PRIMARY_NAV
            .iter()
            .map(|link| NavLinkView {
                label: link.label,
                href: link.href.to_string(),
                active: is_active(link.href, path),
            })
            .collect();
        let service_links = SERVICES
            .iter()
            .map(|service| NavLinkView {
                label: service.short_title,
                href: service.href(),
                active: path == service.href(),
            })
            .collect();

        Self {
            title: if page_title.is_empty() {
                site::COMPANY.name.to_string()
            } else {
                format!("{page_title} | {}", site::COMPANY.name)
            },
            description: site::COMPANY.tagline.to_string(),
            nav,
            service_links,
            company: &site::COMPANY,
            social: site::SOCIAL_LINKS,
            quick_links: &site::PRIMARY_NAV[..site::PRIMARY_NAV.len() - 1],
            year: OffsetDateTime::now_utc().year(),
            toasts: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_notifications(mut self, notifications: &[Notification]) -> Self {
        self.toasts
            .extend(notifications.iter().map(ToastView::from_notification));
        self
    }
}

fn is_active(href: &str, path: &str) -> bool {
    if href == "/" {
        path == "/"
    } else {
        path == href || path.starts_with(&format!("{href}/"))
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: SiteChrome,
    pub hero_stats: &'static [Stat],
    pub services: &'static [Service],
    pub projects: Vec<&'static Project>,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub chrome: SiteChrome,
    pub stats: &'static [Stat],
}

#[derive(Template)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
    pub chrome: SiteChrome,
    pub services: &'static [Service],
}

#[derive(Template)]
#[template(path = "service_detail.html")]
pub struct ServiceDetailTemplate {
    pub chrome: SiteChrome,
    pub service: &'static Service,
    pub others: Vec<&'static Service>,
    pub whatsapp_href: String,
}

#[derive(Template)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate {
    pub chrome: SiteChrome,
    pub projects: &'static [Project],
}

#[derive(Clone, Default)]
pub struct ContactFormView {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl From<&ContactDraft> for ContactFormView {
    fn from(draft: &ContactDraft) -> Self {
        Self {
            name: draft.name.clone(),
            email: draft.email.clone(),
            subject: draft.subject.clone(),
            message: draft.message.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub chrome: SiteChrome,
    pub form: ContactFormView,
    pub error: Option<String>,
    pub whatsapp_href: String,
}

impl ContactTemplate {
    pub fn new(chrome: SiteChrome, form: ContactFormView, error: Option<String>) -> Self {
        Self {
            chrome,
            form,
            error,
            whatsapp_href: contact::whatsapp_href(None),
        }
    }
}

#[derive(Clone)]
pub struct BlogCardView {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub badge: String,
    pub featured: bool,
    pub tags: Vec<String>,
    pub image_url: String,
}

impl BlogCardView {
    pub fn from_post(post: &BlogPost) -> Self {
        Self {
            href: format!("/blog/{}", post.id),
            title: post.title.clone(),
            excerpt: post
                .excerpt
                .clone()
                .unwrap_or_else(|| blog::NO_EXCERPT.to_string()),
            author: post.author.clone(),
            date: blog::format_date(post.published_at),
            read_time: blog::read_time_label(post.content.as_deref()),
            badge: badge(post),
            featured: post.featured,
            tags: blog::card_tags(&post.tags).to_vec(),
            image_url: post
                .image_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        }
    }
}

fn badge(post: &BlogPost) -> String {
    if post.featured {
        "Featured".to_string()
    } else {
        category(post)
    }
}

fn category(post: &BlogPost) -> String {
    post.category
        .clone()
        .unwrap_or_else(|| blog::DEFAULT_CATEGORY.to_string())
}

/// Title and detail of a load failure banner.
#[derive(Clone)]
pub struct LoadNotice {
    pub title: &'static str,
    pub detail: &'static str,
}

pub const BLOG_LOAD_FAILED: LoadNotice = LoadNotice {
    title: "Error loading blog posts",
    detail: "Please try again later",
};

#[derive(Clone, Default)]
pub struct BlogListPanelView {
    pub featured: Vec<BlogCardView>,
    pub regular: Vec<BlogCardView>,
    pub loading: bool,
    pub error: Option<LoadNotice>,
    /// Posts are shown but the latest refresh failed.
    pub stale: bool,
}

impl BlogListPanelView {
    pub fn from_result(result: &QueryResult<BlogPost>) -> Self {
        if result.failed_without_data() {
            return Self {
                error: Some(BLOG_LOAD_FAILED),
                ..Self::default()
            };
        }
        let listing = blog::listing(&result.data);
        Self {
            featured: listing.featured.iter().map(|post| BlogCardView::from_post(post)).collect(),
            regular: listing.regular.iter().map(|post| BlogCardView::from_post(post)).collect(),
            loading: result.is_loading,
            error: None,
            stale: result.error.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.regular.is_empty()
    }
}

#[derive(Template)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub chrome: SiteChrome,
    pub panel: BlogListPanelView,
}

#[derive(Template)]
#[template(path = "blog/list_panel.html")]
pub struct BlogListPanelTemplate {
    pub panel: BlogListPanelView,
}

#[derive(Clone)]
pub struct BlogDetailView {
    pub title: String,
    pub excerpt: Option<String>,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
    pub featured: bool,
    pub image_url: Option<String>,
    pub paragraphs: Vec<String>,
    pub tags: Vec<String>,
}

impl BlogDetailView {
    pub fn from_post(post: &BlogPost) -> Self {
        let paragraphs = post
            .content
            .as_deref()
            .map(blog::paragraphs)
            .filter(|paragraphs| !paragraphs.is_empty())
            .unwrap_or_else(|| vec![blog::NO_CONTENT.to_string()]);
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            date: blog::format_date(post.published_at),
            read_time: blog::read_time_label(post.content.as_deref()),
            category: category(post),
            featured: post.featured,
            image_url: post.image_url.clone(),
            paragraphs,
            tags: post.tags.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "blog/detail.html")]
pub struct BlogDetailTemplate {
    pub chrome: SiteChrome,
    pub post: BlogDetailView,
}

#[derive(Clone)]
pub struct NotFoundView {
    pub heading: String,
    pub message: String,
    pub back_href: &'static str,
    pub back_label: &'static str,
}

impl NotFoundView {
    pub fn page() -> Self {
        Self {
            heading: "404".to_string(),
            message: "Oops! Page not found".to_string(),
            back_href: "/",
            back_label: "Return to Home",
        }
    }

    pub fn article(message: &str) -> Self {
        Self {
            heading: "Blog".to_string(),
            message: message.to_string(),
            back_href: "/blog",
            back_label: "Back to Blog",
        }
    }

    /// The page shown for a `/blog/{id}` lookup that found nothing to display.
    pub fn for_lookup(lookup: &BlogLookup<'_>) -> Option<Self> {
        match lookup {
            BlogLookup::NotFound => Some(Self::article("Article not found")),
            BlogLookup::Unpublished => Some(Self::article("This article is not yet published")),
            BlogLookup::Published(_) => None,
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub chrome: SiteChrome,
    pub page: NotFoundView,
}

#[derive(Clone, Default)]
pub struct AuthPageView {
    pub register: bool,
    pub email: String,
}

#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub chrome: SiteChrome,
    pub auth: AuthPageView,
}
