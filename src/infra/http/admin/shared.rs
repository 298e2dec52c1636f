use askama::Template;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use super::selectors::TOAST_STACK;
use crate::application::{error::HttpError, notify::Notification, stream::PatchBatch};
use crate::infra::http::{AdminSession, HttpSettings, is_datastar, session};
use crate::presentation::{
    admin::views::{AdminChrome, AdminSection},
    views::{ToastStackTemplate, render_fragment, render_template_response},
};

/// How an admin action answers: datastar patches for datastar requests,
/// a flash cookie and a redirect for plain form posts.
pub(super) struct AdminReply {
    datastar: bool,
    secure_cookies: bool,
}

impl AdminReply {
    pub(super) fn new(headers: &HeaderMap, settings: &HttpSettings) -> Self {
        Self {
            datastar: is_datastar(headers),
            secure_cookies: settings.secure_cookies,
        }
    }

    pub(super) fn is_datastar(&self) -> bool {
        self.datastar
    }

    /// Replace `selector` with `html` and show `notification`, or redirect to
    /// `fallback` for plain posts.
    pub(super) fn panel(
        self,
        jar: CookieJar,
        selector: &str,
        html: Result<String, HttpError>,
        notification: Notification,
        fallback: &str,
    ) -> Response {
        if !self.datastar {
            return self.redirect(jar, notification, fallback);
        }
        let html = match html {
            Ok(html) => html,
            Err(err) => return err.into_response(),
        };
        let toasts = match toast_stack(&notification) {
            Ok(toasts) => toasts,
            Err(err) => return err.into_response(),
        };
        let mut batch = PatchBatch::new();
        batch.replace(selector, html).replace(TOAST_STACK, toasts);
        (jar, batch.into_response()).into_response()
    }

    /// Navigate to `to`; the notification is shown there.
    pub(super) fn redirect(self, jar: CookieJar, notification: Notification, to: &str) -> Response {
        let jar = session::set_flash(jar, &[notification], self.secure_cookies);
        if self.datastar {
            let mut batch = PatchBatch::new();
            batch.redirect(to);
            (jar, batch.into_response()).into_response()
        } else {
            (jar, Redirect::to(to)).into_response()
        }
    }
}

fn toast_stack(notification: &Notification) -> Result<String, HttpError> {
    render_fragment(
        &ToastStackTemplate::from_notifications(std::slice::from_ref(notification)),
        "infra::http::admin::toast_stack",
    )
}

/// Chrome for a full admin page, consuming any pending flash notifications.
pub(super) fn admin_chrome(
    jar: CookieJar,
    session: &AdminSession,
    section: AdminSection,
    title: &str,
) -> (CookieJar, AdminChrome) {
    let (jar, flash) = session::take_flash(jar);
    let chrome = AdminChrome::new(section, title, session.user.email.as_deref())
        .with_notifications(&flash);
    (jar, chrome)
}

pub(super) fn page_response<T: Template>(jar: CookieJar, template: T, status: StatusCode) -> Response {
    (jar, render_template_response(template, status)).into_response()
}

/// Lenient id parsing for path and query values; blanks and garbage are `None`.
pub(super) fn parse_id(raw: Option<&str>) -> Option<Uuid> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| Uuid::parse_str(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_leniently() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(Some(&format!(" {id} "))), Some(id));
        assert_eq!(parse_id(Some("")), None);
        assert_eq!(parse_id(Some("nope")), None);
        assert_eq!(parse_id(None), None);
    }
}
