//! Indicator sink adapters.
//!
//! [`SharedIndicator`] keeps the last published value where another part
//! of the firmware (telemetry, a display, a home-automation bridge) can
//! read it.  [`LogIndicator`] logs each change of value to the serial log.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::debug;

use crate::app::ports::IndicatorSink;

#[derive(Debug, Default)]
struct Slot {
    value: AtomicBool,
    publishes: AtomicU32,
}

/// Cloneable indicator; every clone observes the same value.
#[derive(Debug, Clone, Default)]
pub struct SharedIndicator {
    slot: Arc<Slot>,
}

impl SharedIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last published value (`false` before the first publish).
    pub fn value(&self) -> bool {
        self.slot.value.load(Ordering::Relaxed)
    }

    /// Number of publications so far, including repeats.
    pub fn publish_count(&self) -> u32 {
        self.slot.publishes.load(Ordering::Relaxed)
    }
}

impl IndicatorSink for SharedIndicator {
    fn publish(&mut self, value: bool) {
        self.slot.value.store(value, Ordering::Relaxed);
        self.slot.publishes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Logs each change of value; repeated identical publications are silent.
pub struct LogIndicator {
    label: String,
    last: Option<bool>,
}

impl LogIndicator {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            last: None,
        }
    }
}

impl IndicatorSink for LogIndicator {
    fn publish(&mut self, value: bool) {
        if self.last != Some(value) {
            debug!("{}: {}", self.label, if value { "ON" } else { "OFF" });
            self.last = Some(value);
        }
    }
}
