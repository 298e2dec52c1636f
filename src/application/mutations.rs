//! Write paths: one store call, then cache invalidation and a notification.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{CacheTrigger, InvalidationCause};
use crate::domain::contact::NewContactMessage;
use crate::domain::entities::{BlogPost, ContactMessage};
use crate::domain::types::{MessageStatus, Table};

use super::notify::{self, Notification};
use super::repos::{BlogPostPatch, BlogsRepo, ContactMessagesRepo, NewBlogPost, RepoError};

/// A successful mutation and the notification to show for it.
#[derive(Debug)]
pub struct Mutated<T> {
    pub value: T,
    pub notification: Notification,
}

#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct MutationError {
    pub operation: &'static str,
    pub notification: Notification,
    #[source]
    pub source: RepoError,
}

impl MutationError {
    fn new(operation: &'static str, notification: Notification, source: RepoError) -> Self {
        warn!(
            target = "akasite::application::mutations",
            operation,
            error = %source,
            "mutation failed"
        );
        Self {
            operation,
            notification,
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.source, RepoError::NotFound)
    }
}

fn succeeded<T>(
    trigger: &CacheTrigger,
    table: Table,
    operation: &'static str,
    id: Uuid,
    value: T,
    notification: Notification,
) -> Mutated<T> {
    trigger.table_changed(table, InvalidationCause::Mutation);
    info!(
        target = "akasite::application::mutations",
        operation,
        id = %id,
        "mutation applied"
    );
    Mutated {
        value,
        notification,
    }
}

#[derive(Clone)]
pub struct BlogMutations {
    repo: Arc<dyn BlogsRepo>,
    trigger: CacheTrigger,
}

impl BlogMutations {
    pub fn new(repo: Arc<dyn BlogsRepo>, trigger: CacheTrigger) -> Self {
        Self { repo, trigger }
    }

    pub async fn create(&self, post: NewBlogPost) -> Result<Mutated<BlogPost>, MutationError> {
        match self.repo.create_post(post).await {
            Ok(created) => Ok(succeeded(
                &self.trigger,
                Table::Blogs,
                "blog.create",
                created.id,
                created,
                notify::blog::created(),
            )),
            Err(err) => Err(MutationError::new(
                "blog.create",
                notify::blog::failed("create"),
                err,
            )),
        }
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: BlogPostPatch,
    ) -> Result<Mutated<BlogPost>, MutationError> {
        match self.repo.update_post(id, patch).await {
            Ok(updated) => Ok(succeeded(
                &self.trigger,
                Table::Blogs,
                "blog.update",
                id,
                updated,
                notify::blog::updated(),
            )),
            Err(err) => Err(MutationError::new(
                "blog.update",
                notify::blog::failed("update"),
                err,
            )),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<Mutated<Uuid>, MutationError> {
        match self.repo.delete_post(id).await {
            Ok(deleted) => Ok(succeeded(
                &self.trigger,
                Table::Blogs,
                "blog.delete",
                deleted,
                deleted,
                notify::blog::deleted(),
            )),
            Err(err) => Err(MutationError::new(
                "blog.delete",
                notify::blog::failed("delete"),
                err,
            )),
        }
    }
}

#[derive(Clone)]
pub struct ContactMutations {
    repo: Arc<dyn ContactMessagesRepo>,
    trigger: CacheTrigger,
}

impl ContactMutations {
    pub fn new(repo: Arc<dyn ContactMessagesRepo>, trigger: CacheTrigger) -> Self {
        Self { repo, trigger }
    }

    pub async fn create(
        &self,
        message: NewContactMessage,
    ) -> Result<Mutated<ContactMessage>, MutationError> {
        match self.repo.create_message(message).await {
            Ok(created) => Ok(succeeded(
                &self.trigger,
                Table::ContactMessages,
                "contact.create",
                created.id,
                created,
                notify::contact::sent(),
            )),
            Err(err) => Err(MutationError::new(
                "contact.create",
                notify::contact::send_failed(),
                err,
            )),
        }
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<Mutated<ContactMessage>, MutationError> {
        match self.repo.update_message_status(id, status).await {
            Ok(updated) => Ok(succeeded(
                &self.trigger,
                Table::ContactMessages,
                "contact.update_status",
                id,
                updated,
                notify::contact::status_updated(),
            )),
            Err(err) => Err(MutationError::new(
                "contact.update_status",
                notify::contact::status_failed(),
                err,
            )),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<Mutated<Uuid>, MutationError> {
        match self.repo.delete_message(id).await {
            Ok(deleted) => Ok(succeeded(
                &self.trigger,
                Table::ContactMessages,
                "contact.delete",
                deleted,
                deleted,
                notify::contact::deleted(),
            )),
            Err(err) => Err(MutationError::new(
                "contact.delete",
                notify::contact::delete_failed(),
                err,
            )),
        }
    }
}
