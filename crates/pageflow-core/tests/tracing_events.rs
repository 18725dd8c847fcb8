//! Structured log output of navigation, debounce and content swaps.

mod common;

use common::*;
use core::time::Duration;
use pageflow_core::{ContentError, HistoryEntry, LinkTarget};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map(String::as_str).unwrap_or("")
    }
}

struct SpanCapture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message() == message)
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F: FnOnce()>(f: F) -> CaptureHandle {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = SpanCapture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

// =========================================================================

#[test]
fn transition_opens_span_with_target() {
    let handle = with_captured_tracing(|| {
        let mut site = site();
        site.navigate(idx(3), "/archives", false).unwrap();
    });

    let spans = handle.spans();
    let animate: Vec<_> = spans
        .iter()
        .filter(|s| s.name == "transition.animate")
        .collect();
    assert_eq!(animate.len(), 1);
    assert_eq!(animate[0].fields.get("target").map(String::as_str), Some("3"));
    assert_eq!(
        animate[0].fields.get("page_count").map(String::as_str),
        Some("4")
    );

    let started = handle.with_message("transition started");
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].target, "pageflow.transition");
    assert_eq!(started[0].level, tracing::Level::DEBUG);
}

#[test]
fn cleanup_is_logged_when_timer_fires() {
    let handle = with_captured_tracing(|| {
        let mut site = site();
        site.navigate(idx(2), "/projects", false).unwrap();
        site.advance(Duration::from_millis(250));
    });

    let cleanup = handle.with_message("transition cleanup");
    assert_eq!(cleanup.len(), 1);
    assert_eq!(cleanup[0].fields.get("hidden").map(String::as_str), Some("3"));
}

#[test]
fn debounced_click_is_logged() {
    let handle = with_captured_tracing(|| {
        let mut site = site();
        site.on_menu_link("projects", "/projects").unwrap();
        site.on_menu_link("contact", "/contact").unwrap();
    });

    let debounced = handle.with_message("menu click debounced");
    assert_eq!(debounced.len(), 1);
    assert_eq!(debounced[0].target, "pageflow.history");
    assert_eq!(
        debounced[0].fields.get("href").map(String::as_str),
        Some("/contact")
    );
}

#[test]
fn replay_override_is_logged() {
    let handle = with_captured_tracing(|| {
        let mut site = site();
        site.on_history_replay(&HistoryEntry::new(idx(2), "/projects"))
            .unwrap();
        site.on_history_replay(&HistoryEntry::new(idx(3), "/archives"))
            .unwrap();
    });

    assert_eq!(handle.with_message("replay override: cleanup forced").len(), 1);
}

#[test]
fn unknown_menu_identifier_warns() {
    let handle = with_captured_tracing(|| {
        let mut site = site();
        site.on_menu_link("blog", "/blog").unwrap();
    });

    let warnings: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].fields.get("page_id").map(String::as_str), Some("blog"));
}

#[test]
fn failed_content_swap_warns_with_error() {
    let handle = with_captured_tracing(|| {
        let mut site = site();
        site.on_body_link("/gone.html", LinkTarget::SameWindow)
            .unwrap();
        site.advance(Duration::from_millis(100));
        let ticket = site.content().requests[0].ticket;
        site.on_content_loaded(ticket, Err(ContentError::NotFound("/gone.html".into())));
    });

    let failed = handle.with_message("content swap failed, keeping previous content");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].level, tracing::Level::WARN);
    assert!(failed[0].fields.contains_key("error"));
}
