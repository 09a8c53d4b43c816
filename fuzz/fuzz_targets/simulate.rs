//! Replays arbitrary scripts and checks every result against the reference
//! model, validating both containers after each operation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slotset::debug_utils::Simulator;
use slotset_fuzz::TestCase;

fuzz_target!(|t: TestCase| {
    // Ensure the logger is initialized.
    let _ = pretty_env_logger::try_init();

    let stats = Simulator::run(&t.options, &t.script).unwrap();
    log::trace!("Stats:\n{stats}");
});
