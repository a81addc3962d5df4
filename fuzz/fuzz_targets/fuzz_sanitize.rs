#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|html: &str| {
    let once = notesmith_core::sanitize(html);
    let twice = notesmith_core::sanitize(once.as_str());
    assert_eq!(once, twice, "sanitize is not idempotent for {html:?}");
});
