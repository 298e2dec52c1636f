//! datastar SSE responses: one-shot patch batches and long-lived live views.

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, KeepAlive, Sse},
};
use datastar::prelude::{ElementPatchMode, ExecuteScript, PatchElements};
use futures::stream::Stream;

pub fn patch_event(html: String, selector: &str, mode: ElementPatchMode) -> Event {
    PatchElements::new(html)
        .selector(selector)
        .mode(mode)
        .write_as_axum_sse_event()
}

pub fn replace_event(selector: &str, html: String) -> Event {
    patch_event(html, selector, ElementPatchMode::Replace)
}

/// Client-side navigation, used when a live admin view loses its session.
pub fn redirect_event(path: &str) -> Event {
    let target = serde_json::to_string(path).unwrap_or_else(|_| "\"/\"".to_string());
    ExecuteScript::new(format!("window.location.assign({target});")).write_as_axum_sse_event()
}

/// Make the browser reload the current page.
pub fn reload_event() -> Event {
    ExecuteScript::new("window.location.reload();".to_string()).write_as_axum_sse_event()
}

/// A finite batch of datastar events answered to a single action.
#[derive(Default)]
pub struct PatchBatch {
    events: Vec<Event>,
}

impl PatchBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, selector: &str, html: String) -> &mut Self {
        self.events.push(replace_event(selector, html));
        self
    }

    pub fn script(&mut self, script: String) -> &mut Self {
        self.events
            .push(ExecuteScript::new(script).write_as_axum_sse_event());
        self
    }

    pub fn redirect(&mut self, path: &str) -> &mut Self {
        self.events.push(redirect_event(path));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_response(self) -> Response {
        let events = self.events;
        let stream = stream! {
            for event in events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}

/// Wrap an open-ended event stream with periodic keep-alive comments.
pub fn live_response<S>(events: S, keepalive: Duration) -> Response
where
    S: Stream<Item = Event> + Send + 'static,
{
    let stream = stream! {
        for await event in events {
            yield Ok::<Event, Infallible>(event);
        }
    };
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(keepalive))
        .into_response()
}
