//! User-facing notifications emitted by mutations and the auth flow.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

impl NotificationVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationVariant::Default => "default",
            NotificationVariant::Destructive => "destructive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

pub mod blog {
    use super::Notification;

    pub fn created() -> Notification {
        Notification::new(
            "Blog Created!",
            "Your new blog post has been created successfully.",
        )
    }

    pub fn updated() -> Notification {
        Notification::new(
            "Blog Updated!",
            "Your blog post has been successfully updated.",
        )
    }

    pub fn deleted() -> Notification {
        Notification::destructive(
            "Blog Deleted",
            "The blog post has been deleted successfully.",
        )
    }

    pub fn failed(verb: &str) -> Notification {
        Notification::destructive(
            "Error",
            format!("Failed to {verb} blog post. Please try again."),
        )
    }
}

pub mod contact {
    use super::Notification;

    pub fn sent() -> Notification {
        Notification::new(
            "Message Sent!",
            "Thank you for your message. We'll get back to you soon.",
        )
    }

    pub fn status_updated() -> Notification {
        Notification::new(
            "Status Updated",
            "Message status has been updated successfully.",
        )
    }

    pub fn deleted() -> Notification {
        Notification::destructive(
            "Message Deleted",
            "The message has been deleted successfully.",
        )
    }

    pub fn send_failed() -> Notification {
        Notification::destructive("Error", "Failed to send message. Please try again.")
    }

    pub fn status_failed() -> Notification {
        Notification::destructive(
            "Error",
            "Failed to update message status. Please try again.",
        )
    }

    pub fn delete_failed() -> Notification {
        Notification::destructive("Error", "Failed to delete message. Please try again.")
    }
}

pub mod auth {
    use super::Notification;

    pub fn welcome() -> Notification {
        Notification::new("Welcome back!", "Successfully logged in to admin panel.")
    }

    pub fn registered() -> Notification {
        Notification::new(
            "Registration Successful!",
            "Please check your email to confirm your account.",
        )
    }

    pub fn failed(provider_message: impl Into<String>) -> Notification {
        Notification::destructive("Authentication Failed", provider_message)
    }

    pub fn signed_out() -> Notification {
        Notification::new(
            "Logged out successfully",
            "You have been signed out of the admin panel.",
        )
    }

    pub fn sign_out_failed(provider_message: impl Into<String>) -> Notification {
        Notification::destructive("Logout failed", provider_message)
    }
}
