//! Session and flash cookies.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use tracing::debug;

use crate::application::{
    auth::{Session, SessionTokens},
    notify::Notification,
};

pub const SESSION_COOKIE: &str = "akasite_session";
pub const REFRESH_COOKIE: &str = "akasite_refresh";
pub const FLASH_COOKIE: &str = "akasite_flash";

const DEFAULT_ACCESS_TTL_SECS: i64 = 3600;
const REFRESH_TTL: Duration = Duration::days(30);
const FLASH_TTL: Duration = Duration::minutes(1);

pub fn tokens(jar: &CookieJar) -> SessionTokens {
    let read = |name| {
        jar.get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    };
    SessionTokens {
        access_token: read(SESSION_COOKIE),
        refresh_token: read(REFRESH_COOKIE),
    }
}

fn cookie(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

pub fn store_session(jar: CookieJar, session: &Session, secure: bool) -> CookieJar {
    let access_ttl = session
        .expires_in
        .and_then(|secs| i64::try_from(secs).ok())
        .unwrap_or(DEFAULT_ACCESS_TTL_SECS);
    jar.add(cookie(
        SESSION_COOKIE,
        session.access_token.clone(),
        Duration::seconds(access_ttl),
        secure,
    ))
    .add(cookie(
        REFRESH_COOKIE,
        session.refresh_token.clone(),
        REFRESH_TTL,
        secure,
    ))
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(expired(SESSION_COOKIE))
        .remove(expired(REFRESH_COOKIE))
}

/// Queue notifications for the next full page render.
pub fn set_flash(jar: CookieJar, notifications: &[Notification], secure: bool) -> CookieJar {
    if notifications.is_empty() {
        return jar;
    }
    match serde_json::to_vec(notifications) {
        Ok(bytes) => jar.add(cookie(FLASH_COOKIE, hex::encode(bytes), FLASH_TTL, secure)),
        Err(err) => {
            debug!(target = "akasite::http::session", error = %err, "flash encoding failed");
            jar
        }
    }
}

/// Read and clear the flash cookie. Malformed values are dropped.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Vec<Notification>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|cookie| cookie.value().to_string()) else {
        return (jar, Vec::new());
    };
    let notifications = hex::decode(raw)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Vec<Notification>>(&bytes).ok())
        .unwrap_or_default();
    (jar.remove(expired(FLASH_COOKIE)), notifications)
}
