#![no_main]

use libfuzzer_sys::fuzz_target;
use pageflow_core::{PageIndex, SiteConfig};
use pageflow_web::WebSite;
use pageflow_web::session_record::SessionTrace;

fuzz_target!(|data: &[u8]| {
    // Host messages arrive as untrusted JSON; none of these may panic.
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let _ = SiteConfig::from_json_str(text);
    let _ = SessionTrace::from_jsonl(text);

    let Ok(mut web) = WebSite::new(
        SiteConfig::new(["home", "projects", "archives", "contact"]),
        PageIndex::FIRST,
        "/",
    ) else {
        return;
    };
    for line in text.lines().take(64) {
        web.push_encoded_event(line);
    }
    let _ = web.step();
});
