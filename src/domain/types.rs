//! Shared domain enumerations aligned with persisted column values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Published => "Published",
        }
    }

    /// The status the admin toggle moves to.
    pub fn toggled(self) -> Self {
        match self {
            PostStatus::Draft => PostStatus::Published,
            PostStatus::Published => PostStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Unread,
    Read,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Unread => "unread",
            MessageStatus::Read => "read",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unread" => Some(MessageStatus::Unread),
            "read" => Some(MessageStatus::Read),
            _ => None,
        }
    }
}

/// Store tables that feed the query cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Blogs,
    ContactMessages,
}

impl Table {
    pub const ALL: [Table; 2] = [Table::Blogs, Table::ContactMessages];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Blogs => "blogs",
            Table::ContactMessages => "contact_messages",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Table::ALL.into_iter().find(|table| table.as_str() == name)
    }
}

/// Row-level operation reported by the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }

    /// Parse a trigger operation name (`TG_OP`), case-insensitively.
    pub fn from_op(op: &str) -> Option<Self> {
        match op.trim().to_ascii_uppercase().as_str() {
            "INSERT" => Some(ChangeKind::Insert),
            "UPDATE" => Some(ChangeKind::Update),
            "DELETE" => Some(ChangeKind::Delete),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_case_insensitively() {
        assert_eq!(PostStatus::parse(" Published "), Some(PostStatus::Published));
        assert_eq!(PostStatus::parse("archived"), None);
        assert_eq!(MessageStatus::parse("READ"), Some(MessageStatus::Read));
    }

    #[test]
    fn tables_round_trip_through_names() {
        for table in Table::ALL {
            assert_eq!(Table::from_name(table.as_str()), Some(table));
        }
        assert_eq!(Table::from_name("users"), None);
    }

    #[test]
    fn trigger_ops_map_to_change_kinds() {
        assert_eq!(ChangeKind::from_op("INSERT"), Some(ChangeKind::Insert));
        assert_eq!(ChangeKind::from_op("delete"), Some(ChangeKind::Delete));
        assert_eq!(ChangeKind::from_op("TRUNCATE"), None);
    }
}
