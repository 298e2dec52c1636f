//! Cache key identities.

use std::fmt;

/// Identity of one cached collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Blogs,
    ContactMessages,
}

impl QueryKey {
    pub const ALL: [QueryKey; 2] = [QueryKey::Blogs, QueryKey::ContactMessages];

    pub fn as_str(self) -> &'static str {
        match self {
            QueryKey::Blogs => "blogs",
            QueryKey::ContactMessages => "contact-messages",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
