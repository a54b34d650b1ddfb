//! Outbound application events.
//!
//! The [`SequencerService`](super::service::SequencerService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (serial log, telemetry).

use serde::Serialize;

use crate::circuit::{CircuitId, CircuitState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started and driven every output idle.
    Started { circuits: usize },

    /// An open command was admitted; the valve is travelling.
    OpenStarted(CircuitId),

    /// The valve finished travelling and is assumed open.
    OpenCompleted(CircuitId),

    /// The valve was closed; `from` is the state before closing.
    Closed { circuit: CircuitId, from: CircuitState },

    /// The "any circuit open" indicator changed value.
    AggregateChanged(bool),

    /// The command source became reachable or unreachable.
    LinkChanged(bool),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub circuits: Vec<CircuitTelemetry>,
    pub opening: usize,
    pub any_open: bool,
    pub link_up: bool,
    pub tick_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitTelemetry {
    pub id: CircuitId,
    pub name: heapless::String<{ crate::config::CIRCUIT_NAME_LEN }>,
    pub desired_open: bool,
    pub state: CircuitState,
}
