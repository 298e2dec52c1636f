use axum::{
    Router,
    extract::{Form, Path, State},
    http::{StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use crate::application::{error::ErrorReport, query::QueryResult, stream::replace_event};
use crate::domain::{
    blog::{self, BlogLookup},
    contact::{self, ContactDraft, NewContactMessage},
    entities::BlogPost,
    error::DomainError,
    site::{self, HERO_STATS, IMPACT_STATS, PROJECTS, SERVICES},
    types::Table,
};
use crate::presentation::views::{
    AboutTemplate, BlogDetailTemplate, BlogDetailView, BlogIndexTemplate, BlogListPanelTemplate,
    BlogListPanelView, ContactFormView, ContactTemplate, HomeTemplate, NotFoundView,
    PortfolioTemplate, ServiceDetailTemplate, ServicesTemplate, SiteChrome, render_fragment,
    render_not_found_response, render_template_response,
};

use super::{RouterState, live::live_view, repo_error_to_http};

const BLOG_PANEL: &str = "[data-blog-panel=\"list\"]";
const ROBOTS_TXT: &str = "User-agent: *\nAllow: /\nDisallow: /admin\nDisallow: /auth\n";

pub(super) fn routes() -> Router<RouterState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/services", get(services))
        .route("/services/{slug}", get(service_detail))
        .route("/portfolio", get(portfolio))
        .route("/contact", get(contact_page).post(contact_submit))
        .route("/blog", get(blog_index))
        .route("/blog/live", get(blog_live))
        .route("/blog/{id}", get(blog_detail))
        .route("/robots.txt", get(robots))
}

async fn home() -> Response {
    render_template_response(
        HomeTemplate {
            chrome: SiteChrome::new("/", ""),
            hero_stats: HERO_STATS,
            services: SERVICES,
            projects: site::featured_projects().collect(),
        },
        StatusCode::OK,
    )
}

async fn about() -> Response {
    render_template_response(
        AboutTemplate {
            chrome: SiteChrome::new("/about", "About Us"),
            stats: IMPACT_STATS,
        },
        StatusCode::OK,
    )
}

async fn services() -> Response {
    render_template_response(
        ServicesTemplate {
            chrome: SiteChrome::new("/services", "Services"),
            services: SERVICES,
        },
        StatusCode::OK,
    )
}

async fn service_detail(Path(slug): Path<String>, uri: Uri) -> Response {
    let Some(service) = site::service_by_slug(&slug) else {
        return render_not_found_response(
            SiteChrome::new(uri.path(), "Not Found"),
            NotFoundView::page(),
        );
    };
    render_template_response(
        ServiceDetailTemplate {
            chrome: SiteChrome::new(uri.path(), service.title)
                .with_description(service.description),
            service,
            others: SERVICES
                .iter()
                .filter(|other| other.slug != service.slug)
                .collect(),
            whatsapp_href: contact::whatsapp_href(None),
        },
        StatusCode::OK,
    )
}

async fn portfolio() -> Response {
    render_template_response(
        PortfolioTemplate {
            chrome: SiteChrome::new("/portfolio", "Portfolio"),
            projects: PROJECTS,
        },
        StatusCode::OK,
    )
}

fn contact_chrome() -> SiteChrome {
    SiteChrome::new("/contact", "Contact Us")
}

async fn contact_page() -> Response {
    render_template_response(
        ContactTemplate::new(contact_chrome(), ContactFormView::default(), None),
        StatusCode::OK,
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContactForm {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl From<ContactForm> for ContactDraft {
    fn from(form: ContactForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
        }
    }
}

fn contact_error_message(err: &DomainError) -> String {
    match err {
        DomainError::MissingField { field } => format!("Please fill in the {field} field."),
        DomainError::InvalidField { field: "email", .. } => {
            "Please enter a valid email address.".to_string()
        }
        DomainError::InvalidField { field, .. } => format!("Please check the {field} field."),
        DomainError::NotFound { .. } => "Please check the form and try again.".to_string(),
    }
}

async fn contact_submit(
    State(state): State<RouterState>,
    Form(form): Form<ContactForm>,
) -> Response {
    let draft = ContactDraft::from(form);
    let message = match NewContactMessage::validate(&draft) {
        Ok(message) => message,
        Err(err) => {
            info!(
                target = "akasite::http::public",
                field = err.field().unwrap_or(""),
                "contact form rejected"
            );
            return render_template_response(
                ContactTemplate::new(
                    contact_chrome(),
                    ContactFormView::from(&draft),
                    Some(contact_error_message(&err)),
                ),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    match state.app.contact_mutations.create(message).await {
        Ok(created) => render_template_response(
            ContactTemplate::new(
                contact_chrome().with_notifications(&[created.notification]),
                ContactFormView::default(),
                None,
            ),
            StatusCode::OK,
        ),
        Err(err) => {
            const SOURCE: &str = "infra::http::public::contact_submit";
            let status = repo_error_to_http(SOURCE, &err.source).status();
            let report = ErrorReport::from_error(SOURCE, status, &err);
            let mut response = render_template_response(
                ContactTemplate::new(
                    contact_chrome().with_notifications(&[err.notification]),
                    ContactFormView::from(&draft),
                    None,
                ),
                status,
            );
            report.attach(&mut response);
            response
        }
    }
}

fn blog_chrome() -> SiteChrome {
    SiteChrome::new("/blog", "Blog")
        .with_description("Insights, tutorials, and news from the AKACorpTech team.")
}

fn blog_index_response(result: &QueryResult<BlogPost>, source: &'static str) -> Response {
    let status = if result.failed_without_data() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let mut response = render_template_response(
        BlogIndexTemplate {
            chrome: blog_chrome(),
            panel: BlogListPanelView::from_result(result),
        },
        status,
    );
    if let Some(err) = result.error.as_deref().filter(|_| result.failed_without_data()) {
        ErrorReport::from_error(source, status, err).attach(&mut response);
    }
    response
}

async fn blog_index(State(state): State<RouterState>) -> Response {
    let result = state.app.blogs.read().await;
    blog_index_response(&result, "infra::http::public::blog_index")
}

async fn blog_live(State(state): State<RouterState>) -> Response {
    live_view(&state, &[Table::Blogs], None, |app| async move {
        let result = app.blogs.read_settled().await;
        let panel = BlogListPanelTemplate {
            panel: BlogListPanelView::from_result(&result),
        };
        let html = render_fragment(&panel, "infra::http::public::blog_live")?;
        Ok(replace_event(BLOG_PANEL, html))
    })
}

async fn blog_detail(
    State(state): State<RouterState>,
    Path(id): Path<String>,
    uri: Uri,
) -> Response {
    let result = state.app.blogs.read_settled().await;
    if result.failed_without_data() {
        return blog_index_response(&result, "infra::http::public::blog_detail");
    }

    match blog::lookup(&result.data, &id) {
        BlogLookup::Published(post) => {
            let description = post
                .seo_description
                .clone()
                .or_else(|| post.excerpt.clone())
                .unwrap_or_else(|| blog::NO_EXCERPT.to_string());
            let title = post.seo_title.as_deref().unwrap_or(&post.title);
            render_template_response(
                BlogDetailTemplate {
                    chrome: SiteChrome::new(uri.path(), title).with_description(description),
                    post: BlogDetailView::from_post(post),
                },
                StatusCode::OK,
            )
        }
        missing => render_not_found_response(
            SiteChrome::new(uri.path(), "Blog"),
            NotFoundView::for_lookup(&missing).unwrap_or_else(NotFoundView::page),
        ),
    }
}

async fn robots() -> Response {
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], ROBOTS_TXT).into_response()
}

pub(super) async fn not_found(uri: Uri) -> Response {
    render_not_found_response(SiteChrome::new(uri.path(), "Not Found"), NotFoundView::page())
}
