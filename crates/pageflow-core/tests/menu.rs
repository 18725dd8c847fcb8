mod common;

use common::*;
use core::time::Duration;
use pageflow_core::{MenuPhase, TimerKind};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn durations(site: &TestSite) -> Vec<u64> {
    site.surface()
        .menu_items
        .iter()
        .map(|(_, d)| d.as_millis() as u64)
        .collect()
}

fn opacities(site: &TestSite) -> Vec<f32> {
    site.surface().menu_items.iter().map(|(o, _)| *o).collect()
}

#[test]
fn open_fades_links_in_with_growing_durations() {
    let mut site = site();
    assert_eq!(site.on_menu_toggle(), MenuPhase::Open);
    assert!(site.surface().menu_displayed);
    assert_eq!(opacities(&site), vec![0.0; 4]);

    site.advance(ms(9));
    assert_eq!(opacities(&site), vec![0.0; 4]);

    site.advance(ms(1));
    assert_eq!(opacities(&site), vec![1.0; 4]);
    assert_eq!(durations(&site), vec![100, 200, 300, 400]);
}

#[test]
fn close_fades_out_then_removes() {
    let mut site = site();
    site.on_menu_toggle();
    site.advance(ms(50));

    assert_eq!(site.on_menu_toggle(), MenuPhase::Closed);
    assert!(site.menu().closing());
    assert_eq!(opacities(&site), vec![0.0; 4]);
    assert_eq!(durations(&site), vec![600, 500, 400, 300]);
    assert!(site.surface().menu_displayed);

    site.advance(ms(599));
    assert!(site.surface().menu_displayed);
    site.advance(ms(1));
    assert!(!site.surface().menu_displayed);
    assert!(!site.menu().closing());
}

#[test]
fn reopening_during_close_cancels_removal() {
    let mut site = site();
    site.on_menu_toggle();
    site.advance(ms(20));
    site.on_menu_toggle();
    site.advance(ms(300));
    assert_eq!(site.on_menu_toggle(), MenuPhase::Open);
    assert_eq!(site.timers().count_kind(TimerKind::MenuRemoval), 0);

    site.advance(ms(1000));
    assert!(site.surface().menu_displayed);
    assert_eq!(opacities(&site), vec![1.0; 4]);
}

#[test]
fn outside_click_closes_only_an_open_menu() {
    let mut site = site();
    assert!(!site.on_outside_click());
    assert!(site.timers().is_empty());

    site.on_menu_toggle();
    site.advance(ms(10));
    assert!(site.on_outside_click());
    assert_eq!(site.menu().phase(), MenuPhase::Closed);

    // A second click while closing changes nothing.
    assert!(!site.on_outside_click());
    assert_eq!(site.timers().count_kind(TimerKind::MenuRemoval), 1);
}

#[test]
fn closing_before_fade_in_keeps_links_transparent() {
    let mut site = site();
    site.on_menu_toggle();
    site.on_menu_toggle();
    assert_eq!(site.timers().count_kind(TimerKind::MenuFadeIn), 0);

    site.advance(ms(100));
    assert_eq!(opacities(&site), vec![0.0; 4]);
}

#[test]
fn menu_and_transitions_run_side_by_side() {
    let mut site = site();
    site.on_menu_toggle();
    site.on_menu_link("contact", "/contact").unwrap();
    site.on_outside_click();
    site.advance(ms(600));

    assert_eq!(site.surface().visible_pages(), vec![4]);
    assert!(!site.surface().menu_displayed);
    assert!(site.timers().is_empty());
}
