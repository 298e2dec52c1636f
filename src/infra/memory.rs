//! In-process backend: both tables, a change feed and a password auth provider.
//!
//! Used by `serve --backend memory` and by the integration tests. Writes
//! broadcast the same change events the Postgres triggers emit.

use std::cmp::Ordering;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use async_stream::stream;
use async_trait::async_trait;
use dashmap::DashMap;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::application::auth::{AuthError, AuthProvider, AuthUser, Session};
use crate::application::realtime::{ChangeEvent, ChangeFeed, ChangeSubscription, FeedError};
use crate::application::repos::{
    BlogPostPatch, BlogsRepo, CollectionRepo, ContactMessagesRepo, NewBlogPost, RepoError,
};
use crate::cache::lock_mutex;
use crate::domain::contact::NewContactMessage;
use crate::domain::entities::{BlogPost, ContactMessage};
use crate::domain::types::{ChangeKind, MessageStatus, PostStatus, Table};

const SOURCE: &str = "infra::memory";
const CHANGE_CAPACITY: usize = 256;
const SESSION_TTL_SECONDS: u64 = 3600;

struct StoredUser {
    id: String,
    password_hash: Vec<u8>,
}

struct IssuedRefresh {
    email: String,
    access_token: String,
}

pub struct MemoryBackend {
    blogs: Mutex<Vec<BlogPost>>,
    messages: Mutex<Vec<ContactMessage>>,
    changes: broadcast::Sender<ChangeEvent>,
    users: DashMap<String, StoredUser>,
    sessions: DashMap<String, AuthUser>,
    refresh_tokens: DashMap<String, IssuedRefresh>,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            blogs: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            changes,
            users: DashMap::new(),
            sessions: DashMap::new(),
            refresh_tokens: DashMap::new(),
            fail_reads: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }
}

fn hash_password(email: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update([0u8]);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Newest first with never-dated rows on top, matching `ORDER BY ts DESC` in Postgres.
fn newest_first(
    a: (Option<OffsetDateTime>, Uuid),
    b: (Option<OffsetDateTime>, Uuid),
) -> Ordering {
    let by_time = match (a.0, b.0) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => right.cmp(&left),
    };
    by_time.then_with(|| b.1.cmp(&a.1))
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend with sample posts, one message and an admin account.
    pub fn seeded(admin_email: &str, admin_password: &str) -> Self {
        let backend = Self::new();
        backend.add_user(admin_email, admin_password);
        let now = OffsetDateTime::now_utc();
        {
            let mut blogs = lock_mutex(&backend.blogs, SOURCE, "seed");
            blogs.extend(sample_posts(now));
        }
        {
            let mut messages = lock_mutex(&backend.messages, SOURCE, "seed");
            messages.push(ContactMessage {
                id: Uuid::new_v4(),
                name: "Priya Sharma".to_string(),
                email: "priya@example.com".to_string(),
                subject: "Website redesign".to_string(),
                message: "We would like a quote for redesigning our company website.".to_string(),
                status: MessageStatus::Unread,
                created_at: now - Duration::hours(3),
            });
        }
        info!(target = "akasite::infra::memory", admin = admin_email, "memory backend seeded");
        backend
    }

    pub fn add_user(&self, email: &str, password: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.users.insert(
            email.to_string(),
            StoredUser {
                id: id.clone(),
                password_hash: hash_password(email, password),
            },
        );
        id
    }

    /// Replace the stored posts without emitting change events.
    pub fn insert_posts(&self, posts: Vec<BlogPost>) {
        lock_mutex(&self.blogs, SOURCE, "insert_posts").extend(posts);
    }

    pub fn insert_messages(&self, messages: Vec<ContactMessage>) {
        lock_mutex(&self.messages, SOURCE, "insert_messages").extend(messages);
    }

    /// Make every subsequent collection read fail.
    pub fn set_read_failure(&self, fail: bool) {
        self.fail_reads.store(fail, AtomicOrdering::SeqCst);
    }

    /// Number of write calls received, failed ones included.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Invalidate a session at the provider, as an expiry or remote sign-out would.
    pub fn revoke(&self, access_token: &str) {
        self.sessions.remove(access_token);
        self.refresh_tokens
            .retain(|_, issued| issued.access_token != access_token);
    }

    /// Expire an access token while leaving its refresh token usable.
    pub fn expire_access(&self, access_token: &str) {
        self.sessions.remove(access_token);
    }

    /// Announce a change made outside this process's mutation services.
    pub fn emit_change(&self, table: Table, kind: ChangeKind) {
        let _ = self.changes.send(ChangeEvent { table, kind });
    }

    fn read_guard(&self) -> Result<(), RepoError> {
        if self.fail_reads.load(AtomicOrdering::SeqCst) {
            Err(RepoError::from_persistence("memory backend read failure"))
        } else {
            Ok(())
        }
    }

    fn issue_session(&self, email: &str, user: AuthUser) -> Session {
        let access_token = token();
        let refresh_token = token();
        self.sessions.insert(access_token.clone(), user.clone());
        self.refresh_tokens.insert(
            refresh_token.clone(),
            IssuedRefresh {
                email: email.to_string(),
                access_token: access_token.clone(),
            },
        );
        Session {
            access_token,
            refresh_token,
            expires_in: Some(SESSION_TTL_SECONDS),
            user,
        }
    }
}

#[async_trait]
impl CollectionRepo<BlogPost> for MemoryBackend {
    async fn list_all(&self) -> Result<Vec<BlogPost>, RepoError> {
        self.read_guard()?;
        let mut posts = lock_mutex(&self.blogs, SOURCE, "list_blogs").clone();
        posts.sort_by(|a, b| newest_first((a.published_at, a.id), (b.published_at, b.id)));
        Ok(posts)
    }
}

#[async_trait]
impl BlogsRepo for MemoryBackend {
    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPost, RepoError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        let now = OffsetDateTime::now_utc();
        let created = BlogPost {
            id: Uuid::new_v4(),
            title: post.title,
            excerpt: post.excerpt,
            content: post.content,
            author: post.author,
            published_at: (post.status == PostStatus::Published).then_some(now),
            updated_at: Some(now),
            category: post.category,
            tags: post.tags,
            image_url: post.image_url,
            featured: post.featured,
            status: post.status,
            seo_title: post.seo_title,
            seo_description: post.seo_description,
            seo_keywords: post.seo_keywords,
        };
        lock_mutex(&self.blogs, SOURCE, "create_post").push(created.clone());
        self.emit_change(Table::Blogs, ChangeKind::Insert);
        Ok(created)
    }

    async fn update_post(&self, id: Uuid, patch: BlogPostPatch) -> Result<BlogPost, RepoError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        let updated = {
            let mut blogs = lock_mutex(&self.blogs, SOURCE, "update_post");
            let post = blogs
                .iter_mut()
                .find(|post| post.id == id)
                .ok_or(RepoError::NotFound)?;
            patch.apply(post);
            let now = OffsetDateTime::now_utc();
            post.updated_at = Some(now);
            if post.is_published() && post.published_at.is_none() {
                post.published_at = Some(now);
            }
            post.clone()
        };
        self.emit_change(Table::Blogs, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete_post(&self, id: Uuid) -> Result<Uuid, RepoError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        {
            let mut blogs = lock_mutex(&self.blogs, SOURCE, "delete_post");
            let index = blogs
                .iter()
                .position(|post| post.id == id)
                .ok_or(RepoError::NotFound)?;
            blogs.remove(index);
        }
        self.emit_change(Table::Blogs, ChangeKind::Delete);
        Ok(id)
    }
}

#[async_trait]
impl CollectionRepo<ContactMessage> for MemoryBackend {
    async fn list_all(&self) -> Result<Vec<ContactMessage>, RepoError> {
        self.read_guard()?;
        let mut messages = lock_mutex(&self.messages, SOURCE, "list_messages").clone();
        messages.sort_by(|a, b| newest_first((Some(a.created_at), a.id), (Some(b.created_at), b.id)));
        Ok(messages)
    }
}

#[async_trait]
impl ContactMessagesRepo for MemoryBackend {
    async fn create_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, RepoError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        let created = ContactMessage {
            id: Uuid::new_v4(),
            name: message.name().to_string(),
            email: message.email().to_string(),
            subject: message.subject().to_string(),
            message: message.message().to_string(),
            status: MessageStatus::Unread,
            created_at: OffsetDateTime::now_utc(),
        };
        lock_mutex(&self.messages, SOURCE, "create_message").push(created.clone());
        self.emit_change(Table::ContactMessages, ChangeKind::Insert);
        Ok(created)
    }

    async fn update_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<ContactMessage, RepoError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        let updated = {
            let mut messages = lock_mutex(&self.messages, SOURCE, "update_message_status");
            let message = messages
                .iter_mut()
                .find(|message| message.id == id)
                .ok_or(RepoError::NotFound)?;
            message.status = status;
            message.clone()
        };
        self.emit_change(Table::ContactMessages, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete_message(&self, id: Uuid) -> Result<Uuid, RepoError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        {
            let mut messages = lock_mutex(&self.messages, SOURCE, "delete_message");
            let index = messages
                .iter()
                .position(|message| message.id == id)
                .ok_or(RepoError::NotFound)?;
            messages.remove(index);
        }
        self.emit_change(Table::ContactMessages, ChangeKind::Delete);
        Ok(id)
    }
}

#[async_trait]
impl ChangeFeed for MemoryBackend {
    async fn subscribe(&self, table: Table) -> Result<ChangeSubscription, FeedError> {
        let mut receiver = self.changes.subscribe();
        let events = stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.table == table => {
                        yield event;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(
                            target = "akasite::infra::memory",
                            table = table.as_str(),
                            skipped,
                            "change subscriber lagged; resynchronising"
                        );
                        yield ChangeEvent { table, kind: ChangeKind::Update };
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        };
        Ok(ChangeSubscription::new(table, events.boxed()))
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn get_session(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        self.sessions
            .get(access_token)
            .map(|user| user.value().clone())
            .ok_or_else(|| AuthError::rejected("Invalid session"))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let (_, issued) = self
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| AuthError::rejected("Invalid Refresh Token: Refresh Token Not Found"))?;
        let user = self
            .sessions
            .remove(&issued.access_token)
            .map(|(_, user)| user)
            .or_else(|| {
                self.users.get(&issued.email).map(|stored| AuthUser {
                    id: stored.id.clone(),
                    email: Some(issued.email.clone()),
                })
            })
            .ok_or_else(|| AuthError::rejected("User not found"))?;
        Ok(self.issue_session(&issued.email, user))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let user = {
            let stored = self
                .users
                .get(email)
                .ok_or_else(|| AuthError::rejected("Invalid login credentials"))?;
            let candidate = hash_password(email, password);
            if stored.password_hash.ct_eq(&candidate).unwrap_u8() == 0 {
                return Err(AuthError::rejected("Invalid login credentials"));
            }
            AuthUser {
                id: stored.id.clone(),
                email: Some(email.to_string()),
            }
        };
        Ok(self.issue_session(email, user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _redirect_to: &Url,
    ) -> Result<(), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::rejected(
                "Signup requires a valid email and password",
            ));
        }
        if self.users.contains_key(email) {
            return Err(AuthError::rejected("User already registered"));
        }
        self.add_user(email, password);
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        if self.sessions.remove(access_token).is_none() {
            return Err(AuthError::rejected("Invalid session"));
        }
        self.refresh_tokens
            .retain(|_, issued| issued.access_token != access_token);
        Ok(())
    }
}

fn sample_posts(now: OffsetDateTime) -> Vec<BlogPost> {
    let post = |title: &str, days_ago: i64, status: PostStatus, featured: bool| BlogPost {
        id: Uuid::new_v4(),
        title: title.to_string(),
        excerpt: Some(format!("{title}: what we learned shipping it for clients.")),
        content: Some(format!(
            "{title} is a question we hear from almost every client.\n\nThis article walks through how we approach it at AKACorpTech."
        )),
        author: "AKACorpTech Team".to_string(),
        published_at: (status == PostStatus::Published).then(|| now - Duration::days(days_ago)),
        updated_at: Some(now - Duration::days(days_ago)),
        category: Some("Engineering".to_string()),
        tags: vec!["software".to_string(), "delivery".to_string()],
        image_url: None,
        featured,
        status,
        seo_title: None,
        seo_description: None,
        seo_keywords: Vec::new(),
    };
    vec![
        post("Choosing a Cloud Platform", 2, PostStatus::Published, true),
        post("Building Secure Web Apps", 9, PostStatus::Published, false),
        post("Cross-Platform Mobile in Practice", 20, PostStatus::Published, false),
        post("AI for Small Businesses", 0, PostStatus::Draft, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(created_at: OffsetDateTime) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
            status: MessageStatus::Read,
            created_at,
        }
    }

    #[test]
    fn undated_rows_sort_first_then_newest() {
        let older = OffsetDateTime::UNIX_EPOCH;
        let newer = older + Duration::days(1);
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);

        assert_eq!(newest_first((None, a), (Some(newer), b)), Ordering::Less);
        assert_eq!(newest_first((Some(newer), a), (Some(older), b)), Ordering::Less);
        assert_eq!(newest_first((Some(older), b), (Some(older), a)), Ordering::Less);
    }

    #[tokio::test]
    async fn messages_list_newest_first() {
        let backend = MemoryBackend::new();
        let first = message(OffsetDateTime::UNIX_EPOCH);
        let second = message(OffsetDateTime::UNIX_EPOCH + Duration::hours(1));
        backend.insert_messages(vec![first.clone(), second.clone()]);

        let listed = CollectionRepo::<ContactMessage>::list_all(&backend)
            .await
            .expect("list");
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn publishing_stamps_published_at_once() {
        let backend = MemoryBackend::seeded("admin@example.com", "secret");
        let drafts: Vec<_> = CollectionRepo::<BlogPost>::list_all(&backend)
            .await
            .expect("list")
            .into_iter()
            .filter(|post| !post.is_published())
            .collect();
        let draft = drafts.first().expect("seeded draft");
        assert!(draft.published_at.is_none());

        let published = backend
            .update_post(draft.id, BlogPostPatch::status(PostStatus::Published))
            .await
            .expect("publish");
        assert!(published.published_at.is_some());
    }

    #[tokio::test]
    async fn deleting_a_missing_row_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend
            .delete_message(Uuid::new_v4())
            .await
            .expect_err("missing");
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn passwords_are_checked_and_sessions_revocable() {
        let backend = MemoryBackend::new();
        backend.add_user("admin@example.com", "secret");

        assert!(
            backend
                .sign_in_with_password("admin@example.com", "wrong")
                .await
                .is_err()
        );
        let session = backend
            .sign_in_with_password("admin@example.com", "secret")
            .await
            .expect("sign in");
        assert!(backend.get_session(&session.access_token).await.is_ok());

        backend.revoke(&session.access_token);
        assert!(backend.get_session(&session.access_token).await.is_err());
        assert!(backend.refresh_session(&session.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn refresh_rotates_tokens() {
        let backend = MemoryBackend::new();
        backend.add_user("admin@example.com", "secret");
        let session = backend
            .sign_in_with_password("admin@example.com", "secret")
            .await
            .expect("sign in");

        let renewed = backend
            .refresh_session(&session.refresh_token)
            .await
            .expect("refresh");
        assert_ne!(renewed.access_token, session.access_token);
        assert!(backend.get_session(&session.access_token).await.is_err());
        assert!(backend.get_session(&renewed.access_token).await.is_ok());
    }
}
