use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CollectionRepo, ContactMessagesRepo, RepoError},
    domain::{
        contact::NewContactMessage,
        entities::{ContactMessage, ContactMessageRecord},
        types::MessageStatus,
    },
};

use super::{PostgresRepositories, map_sqlx_error};

const MESSAGE_COLUMNS: &str = "id, name, email, subject, message, status, created_at";

#[derive(sqlx::FromRow)]
struct ContactMessageRow {
    id: Uuid,
    name: String,
    email: String,
    subject: String,
    message: String,
    status: Option<String>,
    created_at: OffsetDateTime,
}

impl From<ContactMessageRow> for ContactMessage {
    fn from(row: ContactMessageRow) -> Self {
        ContactMessage::from(ContactMessageRecord {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CollectionRepo<ContactMessage> for PostgresRepositories {
    async fn list_all(&self) -> Result<Vec<ContactMessage>, RepoError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ContactMessageRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ContactMessage::from).collect())
    }
}

#[async_trait]
impl ContactMessagesRepo for PostgresRepositories {
    async fn create_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, RepoError> {
        let sql = format!(
            "INSERT INTO contact_messages (name, email, subject, message, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {MESSAGE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ContactMessageRow>(&sql)
            .bind(message.name())
            .bind(message.email())
            .bind(message.subject())
            .bind(message.message())
            .bind(MessageStatus::Unread.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(ContactMessage::from(row))
    }

    async fn update_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<ContactMessage, RepoError> {
        let sql = format!(
            "UPDATE contact_messages SET status = $2 WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
        );
        sqlx::query_as::<_, ContactMessageRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .map(ContactMessage::from)
            .ok_or(RepoError::NotFound)
    }

    async fn delete_message(&self, id: Uuid) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>("DELETE FROM contact_messages WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)
    }
}
