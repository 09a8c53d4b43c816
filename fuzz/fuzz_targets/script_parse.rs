//! Checks that dumping a script and then re-parsing it is lossless, and that
//! the parser never panics on arbitrary input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slotset::debug_utils::Script;
use slotset_fuzz::TestCase;

fuzz_target!(|input: (TestCase, &str)| {
    // Ensure the logger is initialized.
    let _ = pretty_env_logger::try_init();

    let (t, text) = input;
    let _ = Script::parse(text);

    let dumped = t.script.to_string();
    let parsed = Script::parse(&dumped).unwrap();
    let dumped2 = parsed.to_string();
    assert_eq!(dumped, dumped2);
});
