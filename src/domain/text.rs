//! Normalisation helpers for loosely-typed text coming from forms and rows.

/// Collapse blank (empty or whitespace-only) text to `None`, trimming the rest.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Split a comma separated list, dropping blank entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`split_list`] for pre-filling edit forms.
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}
