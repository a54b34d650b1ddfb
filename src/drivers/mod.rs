//! Actuator drivers and peripheral helpers.

pub mod gpio;
pub mod relay;
pub mod watchdog;
