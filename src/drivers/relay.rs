//! Valve relay driver.
//!
//! Thermo-electric heating valves sit behind a relay; the relay coil is
//! switched by one GPIO.  This driver is a dumb actuator: the sequencer
//! has already resolved polarity, so `drive(true)` always means pin HIGH.
//!
//! Pin write failures are logged and otherwise ignored.  The sequencer
//! has no error path; the next state change simply writes again.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::ValveOutput;
use crate::config::{CIRCUIT_NAME_LEN, truncated_name};

pub struct RelayValve<P: OutputPin> {
    pin: P,
    label: heapless::String<CIRCUIT_NAME_LEN>,
    level: Option<bool>,
    failures: u32,
}

impl<P: OutputPin> RelayValve<P> {
    pub fn new(pin: P, label: &str) -> Self {
        Self {
            pin,
            label: truncated_name(label),
            level: None,
            failures: 0,
        }
    }

    /// Level of the last successful write.
    pub fn level(&self) -> Option<bool> {
        self.level
    }

    /// Number of writes the pin rejected.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ValveOutput for RelayValve<P> {
    fn drive(&mut self, level: bool) {
        let result = if level {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.level = Some(level),
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                warn!("Relay '{}': pin write failed: {:?}", self.label, e);
            }
        }
    }
}
