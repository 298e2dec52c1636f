//! Long-lived datastar streams that re-render a panel whenever its data changes.

use std::future::Future;
use std::sync::Arc;

use async_stream::stream;
use axum::response::{Response, sse::Event};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::application::{
    auth::{AuthEvent, session_key},
    context::AppContext,
    error::HttpError,
    stream::{live_response, redirect_event, reload_event},
};
use crate::cache::{QueryKey, keys_for};
use crate::domain::types::Table;

use super::RouterState;
use super::middleware::{AdminSession, LOGIN_PATH};

enum Step {
    Render,
    Recheck,
    SignedOut,
    Idle,
    Stop,
}

/// Open a live view over `tables`.
///
/// Mounts the change feed for every table, renders once, then renders again
/// each time one of the tables' cache entries is invalidated. With a
/// `session` the stream also watches it and closes once it ends. A sign-out
/// sends the browser to the login page. An access token that stops working
/// while a refresh cookie is held reloads the page instead, so the session
/// gate can renew it.
pub(super) fn live_view<F, Fut>(
    state: &RouterState,
    tables: &'static [Table],
    session: Option<AdminSession>,
    render: F,
) -> Response
where
    F: Fn(Arc<AppContext>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Event, HttpError>> + Send + 'static,
{
    let app = Arc::clone(&state.app);
    let recheck = state.settings.session_recheck;
    let keys: Vec<QueryKey> = tables
        .iter()
        .flat_map(|table| keys_for(*table).iter().copied())
        .collect();

    let events = stream! {
        let mut guards = Vec::with_capacity(tables.len());
        for table in tables {
            match app.realtime.mount(*table).await {
                Ok(guard) => guards.push(guard),
                Err(err) => warn!(
                    target = "akasite::http::live",
                    table = table.as_str(),
                    error = %err,
                    "change feed unavailable; view will not update live"
                ),
            }
        }

        let mut notices = app.cache.subscribe();
        let mut auth_events = app.auth.subscribe();
        let watched = session.as_ref().map(|session| session_key(&session.access_token));
        let mut ticker = interval(recheck);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        match render(Arc::clone(&app)).await {
            Ok(event) => yield event,
            Err(err) => warn!(target = "akasite::http::live", error = ?err, "initial render failed"),
        }

        loop {
            let step = tokio::select! {
                notice = notices.recv() => match notice {
                    Ok(notice) if keys.contains(&notice.key) => Step::Render,
                    Ok(_) => Step::Idle,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(target = "akasite::http::live", skipped, "cache notices lagged");
                        Step::Render
                    }
                    Err(RecvError::Closed) => Step::Stop,
                },
                event = auth_events.recv(), if watched.is_some() => match event {
                    Ok(AuthEvent::SignedOut { session_key }) if watched.as_ref() == Some(&session_key) => {
                        Step::SignedOut
                    }
                    Ok(_) => Step::Idle,
                    Err(RecvError::Lagged(_)) => Step::Recheck,
                    Err(RecvError::Closed) => Step::Stop,
                },
                _ = ticker.tick(), if watched.is_some() => Step::Recheck,
            };

            match step {
                Step::Render => {
                    // Collapse a burst of invalidations into one render.
                    while notices.try_recv().is_ok() {}
                    match render(Arc::clone(&app)).await {
                        Ok(event) => yield event,
                        Err(err) => warn!(target = "akasite::http::live", error = ?err, "live render failed"),
                    }
                }
                Step::Recheck => {
                    let Some(session) = session.as_ref() else {
                        continue;
                    };
                    if !app.auth.still_signed_in(&session.access_token).await {
                        if session.renewable {
                            debug!(target = "akasite::http::live", "access token rejected; reloading to renew");
                            yield reload_event();
                        } else {
                            debug!(target = "akasite::http::live", "session ended; closing live view");
                            yield redirect_event(LOGIN_PATH);
                        }
                        break;
                    }
                }
                Step::SignedOut => {
                    yield redirect_event(LOGIN_PATH);
                    break;
                }
                Step::Idle => {}
                Step::Stop => break,
            }
        }

        drop(guards);
    };

    live_response(events, state.settings.live_keepalive)
}
