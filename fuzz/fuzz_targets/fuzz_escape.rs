#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let literal = notesmith_core::escape(text);
    let out = literal.as_str();
    assert!(!out.contains(['\n', '\r']), "raw line break in {out:?}");
    assert!(!out.contains(['{', '}']), "brace in {out:?}");

    let trailing = out.chars().rev().take_while(|&c| c == '\\').count();
    assert_eq!(trailing % 2, 0, "dangling backslash in {out:?}");
});
