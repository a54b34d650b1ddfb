//! System configuration parameters
//!
//! All tunable parameters for the valve sequencer: the concurrency cap,
//! the modelled open time, loop cadence, and the circuit table.
//! Values are persisted in NVS (see [`crate::adapters::nvs`]) and fall
//! back to [`SystemConfig::default`] on first boot.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::circuit::MAX_CIRCUITS;
use crate::sequencer::SequencerConfig;

/// Maximum length of a circuit name in bytes.
pub const CIRCUIT_NAME_LEN: usize = 24;

/// One configured heating circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitConfig {
    /// Human-readable name, used in logs and telemetry.
    pub name: String<CIRCUIT_NAME_LEN>,
    /// GPIO driving the valve relay.
    pub gpio: i32,
    /// Relay is active-low (logical ON drives the pin LOW).
    pub inverted: bool,
}

impl CircuitConfig {
    /// Build a circuit entry.  Names longer than [`CIRCUIT_NAME_LEN`] are
    /// truncated at a character boundary.
    pub fn new(name: &str, gpio: i32, inverted: bool) -> Self {
        Self {
            name: truncated_name(name),
            gpio,
            inverted,
        }
    }
}

/// Copy `name` into a fixed-capacity string, dropping whatever does not fit.
pub(crate) fn truncated_name(name: &str) -> String<CIRCUIT_NAME_LEN> {
    let mut buf = String::new();
    for ch in name.chars() {
        if buf.push(ch).is_err() {
            break;
        }
    }
    buf
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sequencing ---
    /// Maximum number of circuits allowed to be opening at the same time.
    pub max_concurrent: i32,
    /// Time a valve needs to travel fully open (milliseconds).
    pub open_time_ms: u32,

    // --- Timing ---
    /// Main loop cadence (milliseconds)
    pub loop_interval_ms: u32,
    /// Command source is considered unreachable after this much silence (milliseconds)
    pub link_timeout_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Circuits ---
    /// Registered in this order; lower index wins admission ties.
    pub circuits: Vec<CircuitConfig, MAX_CIRCUITS>,
}

impl SystemConfig {
    /// The immutable parameters handed to the sequencing core.
    pub fn sequencer(&self) -> SequencerConfig {
        SequencerConfig {
            max_concurrent_open: self.max_concurrent,
            open_duration_ms: self.open_time_ms,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sequencing
            max_concurrent: 5,
            open_time_ms: 5 * 60 * 1000, // 5 min

            // Timing
            loop_interval_ms: 50,        // 20 Hz
            link_timeout_ms: 30_000,     // 30 s
            telemetry_interval_secs: 60, // 1/min

            circuits: Vec::new(),
        }
    }
}
