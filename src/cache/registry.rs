//! Static mapping from store tables to the cache keys derived from them.

use crate::domain::types::Table;

use super::keys::QueryKey;

/// Every table that feeds the cache, with the keys a change to it invalidates.
pub static TABLE_KEYS: &[(Table, &[QueryKey])] = &[
    (Table::Blogs, &[QueryKey::Blogs]),
    (Table::ContactMessages, &[QueryKey::ContactMessages]),
];

pub fn keys_for(table: Table) -> &'static [QueryKey] {
    TABLE_KEYS
        .iter()
        .find(|(candidate, _)| *candidate == table)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}
