//! End-to-end host sessions: events in, surface operations and requests out.

use core::time::Duration;

use pageflow_core::{ContentTicket, Display, PageIndex, SiteConfig};
use pageflow_web::session_record::{SessionRecorder, SessionTrace, TraceRecord, replay};
use pageflow_web::{ContentOutcome, HostEvent, SurfaceOp, WebSite};
use pretty_assertions::assert_eq;

const MS: u64 = 1_000_000;

fn idx(n: usize) -> PageIndex {
    PageIndex::new(n).unwrap()
}

fn config() -> SiteConfig {
    SiteConfig::new(["home", "projects", "archives", "contact"])
}

fn web() -> WebSite {
    WebSite::new(config(), PageIndex::FIRST, "/").unwrap()
}

fn menu(id: &str) -> HostEvent {
    HostEvent::MenuLink {
        page_id: id.to_string(),
        href: format!("/{id}"),
    }
}

#[test]
fn back_and_forward_replay_stored_entries() {
    let mut web = web();
    web.dispatch(menu("projects")).unwrap();
    web.advance_time(Duration::from_millis(300));
    web.step().unwrap();
    web.dispatch(menu("archives")).unwrap();
    web.advance_time(Duration::from_millis(300));
    web.step().unwrap();
    assert_eq!(web.history().len(), 3);

    assert!(!web.dispatch(HostEvent::Back).unwrap());
    assert_eq!(web.site().active(), idx(2));
    web.advance_time(Duration::from_millis(300));
    web.step().unwrap();
    assert_eq!(web.surface().visible_pages(), vec![idx(2)]);

    web.dispatch(HostEvent::Forward).unwrap();
    assert_eq!(web.site().active(), idx(3));
    // Replays never push.
    assert_eq!(web.history().len(), 3);
}

#[test]
fn rapid_back_presses_land_immediately() {
    let mut web = web();
    for id in ["projects", "archives", "contact"] {
        web.dispatch(menu(id)).unwrap();
        web.advance_time(Duration::from_millis(300));
        web.step().unwrap();
    }

    web.dispatch(HostEvent::Back).unwrap();
    web.advance_time(Duration::from_millis(40));
    web.step().unwrap();
    web.dispatch(HostEvent::Back).unwrap();

    assert_eq!(web.site().active(), idx(2));
    assert_eq!(web.surface().visible_pages(), vec![idx(2)]);
    assert!(!web.surface().scroll_suppressed());
}

#[test]
fn content_swap_round_trip_through_host() {
    let mut web = web();
    let prevent = web
        .dispatch(HostEvent::BodyLink {
            href: "/notes.html".into(),
            target: None,
        })
        .unwrap();
    assert!(prevent);
    web.take_ops();

    web.advance_time(Duration::from_millis(100));
    web.step().unwrap();
    let requests = web.take_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/notes.html");
    assert_eq!(requests[0].selector, ".ajaxHook");

    let loaded = format!(
        r#"{{"kind":"content_loaded","ticket":{},"outcome":{{"status":"loaded","markup":"<p>hi</p>"}}}}"#,
        requests[0].ticket.0
    );
    assert!(web.push_encoded_event(&loaded));
    web.step().unwrap();

    let ops = web.take_ops();
    assert!(ops.contains(&SurfaceOp::InsertContent {
        page: idx(1),
        markup: "<p>hi</p>".into()
    }));
    assert_eq!(ops.last(), Some(&SurfaceOp::ScrollToTop));
    assert_eq!(web.surface().page(idx(1)).unwrap().markup, "<p>hi</p>");
}

#[test]
fn blank_target_links_are_not_prevented() {
    let mut web = web();
    let prevent = web
        .dispatch(HostEvent::BodyLink {
            href: "https://example.org".into(),
            target: Some("_blank".into()),
        })
        .unwrap();
    assert!(!prevent);
    assert!(web.take_ops().is_empty());
}

#[test]
fn unknown_ticket_is_ignored() {
    let mut web = web();
    web.dispatch(HostEvent::ContentLoaded {
        ticket: ContentTicket(42),
        outcome: ContentOutcome::NotFound,
    })
    .unwrap();
    assert!(web.take_ops().is_empty());
}

#[test]
fn transition_ops_reach_the_host_in_order() {
    let mut web = web();
    web.take_ops();
    web.dispatch(menu("archives")).unwrap();
    let ops = web.take_ops();

    assert_eq!(ops[0], SurfaceOp::ScrollSuppressed { suppressed: true });
    let display_pos = ops
        .iter()
        .position(|op| {
            *op == SurfaceOp::Display {
                page: idx(3),
                display: Display::Rendered,
            }
        })
        .unwrap();
    let highlight_pos = ops
        .iter()
        .position(|op| *op == SurfaceOp::Highlight { page: idx(3) })
        .unwrap();
    assert!(display_pos < highlight_pos);
}

// =========================================================================
// Record / replay
// =========================================================================

fn record_session() -> SessionTrace {
    let mut recorder = SessionRecorder::new(config(), PageIndex::FIRST, "/").unwrap();
    recorder.init();

    recorder.push_event(0, menu("archives"));
    recorder.step().unwrap();
    recorder.advance_time(120 * MS, Duration::from_millis(120));
    recorder.push_event(120 * MS, HostEvent::MenuToggle);
    recorder.step().unwrap();
    recorder.advance_time(300 * MS, Duration::from_millis(180));
    recorder.push_event(300 * MS, HostEvent::Back);
    recorder.step().unwrap();
    recorder.advance_time(350 * MS, Duration::from_millis(50));
    recorder.push_event(350 * MS, HostEvent::Forward);
    recorder.push_event(350 * MS, HostEvent::OutsideClick);
    recorder.step().unwrap();
    recorder.advance_time(1_000 * MS, Duration::from_millis(650));
    recorder.step().unwrap();
    recorder.finish()
}

#[test]
fn record_replay_identical_checksums() {
    let trace = record_session();
    let result = replay(config(), &trace).unwrap();
    assert!(result.ok(), "mismatch: {:?}", result.first_mismatch);
    assert_eq!(result.total_frames, trace.frame_count());
    assert_eq!(Some(result.final_checksum_chain), trace.final_checksum_chain());
}

#[test]
fn same_inputs_produce_same_trace() {
    assert_eq!(record_session(), record_session());
}

#[test]
fn trace_survives_jsonl_round_trip() {
    let trace = record_session();
    let text = trace.to_jsonl().unwrap();
    assert!(text.lines().next().unwrap().contains(r#""type":"header""#));
    let parsed = SessionTrace::from_jsonl(&text).unwrap();
    assert_eq!(parsed, trace);
    assert!(replay(config(), &parsed).unwrap().ok());
}

#[test]
fn tampered_trace_is_detected() {
    let mut trace = record_session();
    // Drop the first navigation: everything after it diverges.
    trace
        .records
        .retain(|r| !matches!(r, TraceRecord::Input { event: HostEvent::MenuLink { .. }, .. }));
    let result = replay(config(), &trace).unwrap();
    assert!(!result.ok());
    assert_eq!(result.first_mismatch.unwrap().frame_idx, 1);
}
