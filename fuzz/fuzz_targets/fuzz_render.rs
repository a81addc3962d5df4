#![no_main]

use libfuzzer_sys::fuzz_target;
use notesmith_core::MarkdownText;

fuzz_target!(|markdown: &str| {
    let html = notesmith_core::render(&MarkdownText::new(markdown));
    assert!(!html.as_str().contains("<script"));
});
