//! Application core — domain orchestration, zero direct I/O.
//!
//! This module wires the pure [`Sequencer`](crate::sequencer::Sequencer)
//! to the outside world.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
