//! Contact form validation and reply helpers.

use url::form_urlencoded::byte_serialize;

use super::{error::DomainError, site::COMPANY};

const REPLY_PREFIX: &str = "Re: ";

/// Raw contact form input, exactly as submitted.
#[derive(Debug, Clone, Default)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// A contact submission that passed validation; only [`NewContactMessage::validate`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl NewContactMessage {
    /// Check required fields in form order (name, email, subject, message).
    pub fn validate(draft: &ContactDraft) -> Result<Self, DomainError> {
        let name = required("name", &draft.name)?;
        let email = required("email", &draft.email)?;
        if !looks_like_email(&email) {
            return Err(DomainError::invalid(
                "email",
                "enter a valid email address",
            ));
        }
        let subject = required("subject", &draft.subject)?;
        let message = required("message", &draft.message)?;

        Ok(Self {
            name,
            email,
            subject,
            message,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn required(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DomainError::missing(field))
    } else {
        Ok(trimmed.to_string())
    }
}

// Same shape check browsers apply to `type="email"` inputs.
fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Subject line for a reply, without stacking prefixes.
pub fn reply_subject(subject: &str) -> String {
    let trimmed = subject.trim();
    let already = trimmed
        .get(..REPLY_PREFIX.len() - 1)
        .is_some_and(|head| head.eq_ignore_ascii_case("re:"));
    if already {
        trimmed.to_string()
    } else {
        format!("{REPLY_PREFIX}{trimmed}")
    }
}

/// `mailto:` link replying to a message.
pub fn reply_href(email: &str, subject: &str) -> String {
    format!(
        "mailto:{}?subject={}",
        email.trim(),
        encode_component(&reply_subject(subject))
    )
}

/// WhatsApp chat link with a prefilled greeting.
pub fn whatsapp_href(name: Option<&str>) -> String {
    let who = name
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("interested in your services");
    let text = format!("Hi, I'm {who}. I would like to discuss a project with you.");
    format!("{}?text={}", COMPANY.whatsapp_url, encode_component(&text))
}

// Percent-encode for URI components; form encoding uses `+` for spaces,
// which mail clients do not decode in `mailto:` queries.
fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ContactDraft {
        ContactDraft {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            subject: "Web project".to_string(),
            message: "We need a site.".to_string(),
        }
    }

    #[test]
    fn valid_draft_is_trimmed() {
        let mut input = draft();
        input.name = "  Asha  ".to_string();

        let message = NewContactMessage::validate(&input).expect("valid draft");
        assert_eq!(message.name(), "Asha");
        assert_eq!(message.subject(), "Web project");
    }

    #[test]
    fn empty_subject_is_rejected() {
        let mut input = draft();
        input.subject = "   ".to_string();

        let err = NewContactMessage::validate(&input).expect_err("missing subject");
        assert_eq!(err, DomainError::missing("subject"));
        assert_eq!(err.field(), Some("subject"));
    }

    #[test]
    fn first_missing_field_is_reported() {
        let err = NewContactMessage::validate(&ContactDraft::default()).expect_err("empty form");
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut input = draft();
        input.email = "asha.example.com".to_string();

        let err = NewContactMessage::validate(&input).expect_err("bad email");
        assert_eq!(err.field(), Some("email"));
    }

    #[test]
    fn reply_subject_does_not_double_prefix() {
        assert_eq!(reply_subject("Quote"), "Re: Quote");
        assert_eq!(reply_subject("Re: Quote"), "Re: Quote");
        assert_eq!(reply_subject("RE: Quote"), "RE: Quote");
    }

    #[test]
    fn reply_href_encodes_subject() {
        assert_eq!(
            reply_href("asha@example.com", "Cost & time?"),
            "mailto:asha@example.com?subject=Re%3A%20Cost%20%26%20time%3F"
        );
    }

    #[test]
    fn whatsapp_link_falls_back_without_name() {
        let href = whatsapp_href(None);
        assert!(href.starts_with("https://wa.me/917678245132?text=Hi%2C%20I%27m%20interested"));
    }
}
