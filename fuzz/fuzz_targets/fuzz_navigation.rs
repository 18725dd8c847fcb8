#![no_main]

use core::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pageflow_core::{ContentTicket, PageIndex, RenderSurface, SiteConfig};
use pageflow_web::{ContentOutcome, HostEvent, WebSite};

#[derive(Debug, Arbitrary)]
enum Op {
    Menu(u8),
    Body { new_window: bool },
    Back,
    Forward,
    Popstate(u8),
    Toggle,
    Outside,
    Advance(u16),
    Load { ticket: u8, ok: bool },
    Step,
}

fuzz_target!(|input: (u8, Vec<Op>)| {
    let (pages, ops) = input;
    // 1..=8 pages.
    let page_count = usize::from(pages % 8) + 1;
    let ids: Vec<String> = (1..=page_count).map(|n| format!("p{n}")).collect();
    let Ok(mut web) = WebSite::new(SiteConfig::new(ids.clone()), PageIndex::FIRST, "/") else {
        return;
    };

    for op in ops.iter().take(256) {
        let event = match op {
            Op::Menu(i) => HostEvent::MenuLink {
                // Indices past the end exercise the unknown-identifier path.
                page_id: ids.get(usize::from(*i) % (page_count + 1)).cloned().unwrap_or_default(),
                href: format!("/{i}"),
            },
            Op::Body { new_window } => HostEvent::BodyLink {
                href: "/inner".into(),
                target: new_window.then(|| "_blank".to_string()),
            },
            Op::Back => HostEvent::Back,
            Op::Forward => HostEvent::Forward,
            Op::Popstate(i) => match PageIndex::new(usize::from(*i)) {
                Some(item) => HostEvent::Popstate {
                    item,
                    url: format!("/{i}"),
                },
                None => continue,
            },
            Op::Toggle => HostEvent::MenuToggle,
            Op::Outside => HostEvent::OutsideClick,
            Op::Advance(ms) => {
                web.advance_time(Duration::from_millis(u64::from(*ms)));
                continue;
            }
            Op::Load { ticket, ok } => HostEvent::ContentLoaded {
                ticket: ContentTicket(u64::from(*ticket)),
                outcome: if *ok {
                    ContentOutcome::Loaded {
                        markup: "<p>x</p>".into(),
                    }
                } else {
                    ContentOutcome::NotFound
                },
            },
            Op::Step => {
                let _ = web.step();
                continue;
            }
        };
        let _ = web.dispatch(event);

        let active = web.site().active();
        assert!(
            web.surface().is_visible(active),
            "active page {active} not rendered"
        );
    }

    web.advance_time(Duration::from_secs(10));
    let _ = web.step();
    assert!(web.site().timers().is_empty(), "timers left after quiescence");
    assert_eq!(
        web.surface().visible_pages(),
        vec![web.site().active()],
        "stale pages left rendered"
    );
    assert!(!web.surface().scroll_suppressed());
});
