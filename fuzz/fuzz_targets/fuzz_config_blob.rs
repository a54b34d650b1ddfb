//! Fuzz target: persisted configuration blob
//!
//! Decodes arbitrary bytes as a postcard `SystemConfig` and verifies:
//! - No panics under arbitrary byte inputs
//! - Anything that decodes and validates also builds a sequencer whose
//!   circuit count matches the config (table capacity is never exceeded)
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use valve_sequencer::adapters::nvs::validate_config;
use valve_sequencer::config::SystemConfig;
use valve_sequencer::sequencer::Sequencer;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = postcard::from_bytes::<SystemConfig>(data) else {
        return;
    };
    if validate_config(&cfg).is_err() {
        return;
    }

    let mut seq = Sequencer::new(cfg.sequencer());
    for c in &cfg.circuits {
        assert!(seq.register(&c.name, c.inverted).is_some());
    }
    assert_eq!(seq.circuits().len(), cfg.circuits.len());
});
