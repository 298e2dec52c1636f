//! Change feed over `LISTEN akasite_changes`.

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use sqlx::postgres::{PgListener, PgPool};
use tracing::{debug, warn};

use crate::application::realtime::{ChangeEvent, ChangeFeed, ChangeSubscription, FeedError};
use crate::domain::types::{ChangeKind, Table};

pub const CHANGE_CHANNEL: &str = "akasite_changes";

#[derive(Deserialize)]
struct ChangePayload {
    table: String,
    op: String,
}

/// Decode a trigger payload; unknown tables or operations yield `None`.
pub fn parse_change_payload(payload: &str) -> Option<ChangeEvent> {
    let parsed: ChangePayload = serde_json::from_str(payload).ok()?;
    Some(ChangeEvent {
        table: Table::from_name(&parsed.table)?,
        kind: ChangeKind::from_op(&parsed.op)?,
    })
}

#[derive(Clone)]
pub struct PgChangeFeed {
    pool: PgPool,
}

impl PgChangeFeed {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChangeFeed for PgChangeFeed {
    async fn subscribe(&self, table: Table) -> Result<ChangeSubscription, FeedError> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(|err| FeedError::Connect(err.to_string()))?;
        listener
            .listen(CHANGE_CHANNEL)
            .await
            .map_err(|err| FeedError::Subscribe(err.to_string()))?;

        let events = stream! {
            loop {
                match listener.try_recv().await {
                    Ok(Some(notification)) => match parse_change_payload(notification.payload()) {
                        Some(event) if event.table == table => {
                            yield event;
                        }
                        Some(_) => {}
                        None => warn!(
                            target = "akasite::infra::db::changes",
                            payload = notification.payload(),
                            "ignoring malformed change payload"
                        ),
                    },
                    Ok(None) => {
                        // Notifications may have been missed while disconnected;
                        // the listener reconnects on the next call.
                        debug!(
                            target = "akasite::infra::db::changes",
                            table = table.as_str(),
                            "change feed connection lost; resynchronising"
                        );
                        yield ChangeEvent { table, kind: ChangeKind::Update };
                    }
                    Err(err) => {
                        warn!(
                            target = "akasite::infra::db::changes",
                            table = table.as_str(),
                            error = %err,
                            "change feed listener failed"
                        );
                        break;
                    }
                }
            }
        };

        Ok(ChangeSubscription::new(table, events.boxed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_payloads_decode_into_events() {
        assert_eq!(
            parse_change_payload(r#"{"table":"contact_messages","op":"INSERT"}"#),
            Some(ChangeEvent {
                table: Table::ContactMessages,
                kind: ChangeKind::Insert,
            })
        );
    }

    #[test]
    fn foreign_tables_and_garbage_are_ignored() {
        assert_eq!(parse_change_payload(r#"{"table":"users","op":"INSERT"}"#), None);
        assert_eq!(parse_change_payload(r#"{"table":"blogs","op":"TRUNCATE"}"#), None);
        assert_eq!(parse_change_payload("not json"), None);
    }
}
