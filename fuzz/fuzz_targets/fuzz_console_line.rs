//! Fuzz target: serial console line parser
//!
//! Feeds arbitrary UTF-8 lines to `parse_line` and checks:
//! - No panics on any input
//! - Every accepted `open` / `close` line round-trips through its index
//!
//! cargo fuzz run fuzz_console_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use valve_sequencer::adapters::console::{ConsoleCommand, parse_line};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };

    match parse_line(line) {
        Ok(ConsoleCommand::Open(n)) | Ok(ConsoleCommand::Close(n)) => {
            let mut words = line.split_whitespace();
            words.next();
            let arg = words.next().expect("accepted line has an argument");
            assert_eq!(arg.parse::<usize>().ok(), Some(n));
        }
        Ok(_) | Err(_) => {}
    }
});
