//! Wiring of the application services over one backend.

use std::sync::Arc;

use url::Url;

use crate::cache::{CacheConfig, CacheTrigger, QueryCache};
use crate::domain::entities::{BlogPost, ContactMessage};

use super::auth::{AuthProvider, AuthService};
use super::dashboard::DashboardService;
use super::mutations::{BlogMutations, ContactMutations};
use super::query::QueryService;
use super::realtime::{ChangeFeed, RealtimeHub};
use super::repos::{BlogsRepo, CollectionRepo, ContactMessagesRepo};

/// Handles onto the backend services; every field is independently replaceable.
#[derive(Clone)]
pub struct Backend {
    pub blogs_read: Arc<dyn CollectionRepo<BlogPost>>,
    pub blogs: Arc<dyn BlogsRepo>,
    pub messages_read: Arc<dyn CollectionRepo<ContactMessage>>,
    pub messages: Arc<dyn ContactMessagesRepo>,
    pub feed: Arc<dyn ChangeFeed>,
    pub auth: Arc<dyn AuthProvider>,
}

impl Backend {
    /// Build from one store implementing both tables.
    pub fn from_store<S>(store: Arc<S>, feed: Arc<dyn ChangeFeed>, auth: Arc<dyn AuthProvider>) -> Self
    where
        S: BlogsRepo + ContactMessagesRepo + 'static,
    {
        Self {
            blogs_read: store.clone(),
            blogs: store.clone(),
            messages_read: store.clone(),
            messages: store,
            feed,
            auth,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub cache: Arc<QueryCache>,
    pub trigger: CacheTrigger,
    pub blogs: QueryService<BlogPost>,
    pub messages: QueryService<ContactMessage>,
    pub blog_mutations: BlogMutations,
    pub contact_mutations: ContactMutations,
    pub dashboard: DashboardService,
    pub realtime: Arc<RealtimeHub>,
    pub auth: AuthService,
}

impl AppContext {
    pub fn new(backend: Backend, cache: CacheConfig, public_url: &Url) -> Self {
        let cache = Arc::new(QueryCache::new(cache));
        let trigger = CacheTrigger::new(Arc::clone(&cache));
        let blogs = QueryService::new(Arc::clone(&cache), backend.blogs_read);
        let messages = QueryService::new(Arc::clone(&cache), backend.messages_read);

        Self {
            blog_mutations: BlogMutations::new(backend.blogs, trigger.clone()),
            contact_mutations: ContactMutations::new(backend.messages, trigger.clone()),
            dashboard: DashboardService::new(blogs.clone(), messages.clone()),
            realtime: RealtimeHub::new(backend.feed, trigger.clone()),
            auth: AuthService::new(backend.auth, public_url),
            cache,
            trigger,
            blogs,
            messages,
        }
    }
}
