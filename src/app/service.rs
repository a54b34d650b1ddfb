//! Application service — the hexagonal core.
//!
//! [`SequencerService`] owns the [`Sequencer`], the per-circuit desired
//! state (the optimistic "switch" each circuit is commanded through), and
//! the sinks every circuit publishes to.  All I/O flows through port
//! traits, making the whole service testable with mock adapters.
//!
//! ```text
//!   ClockPort ──▶ ┌──────────────────────────┐ ──▶ ValveOutput
//!    LinkPort ──▶ │     SequencerService     │ ──▶ IndicatorSink
//!  AppCommand ──▶ │ desired · Sequencer · io │ ──▶ EventSink
//!                 └──────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::circuit::{CircuitId, CircuitStore};
use crate::sequencer::{Intent, Sequencer, SequencerConfig, Transition};

use super::commands::AppCommand;
use super::events::{AppEvent, CircuitTelemetry, TelemetryData};
use super::ports::{ClockPort, EventSink, IndicatorSink, LinkPort, ValveOutput};

/// Sinks bound to one circuit.  Any of them may be absent; absent sinks
/// are skipped silently.
struct CircuitIo {
    valve: Option<Box<dyn ValveOutput>>,
    status: Option<Box<dyn IndicatorSink>>,
    motion: Option<Box<dyn IndicatorSink>>,
}

// ───────────────────────────────────────────────────────────────
// SequencerService
// ───────────────────────────────────────────────────────────────

pub struct SequencerService {
    sequencer: Sequencer,
    io: Vec<CircuitIo>,
    desired: Vec<bool>,
    aggregate: Option<Box<dyn IndicatorSink>>,
    any_open: bool,
    link_up: Option<bool>,
    deferred: usize,
    tick_count: u64,
}

impl SequencerService {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            sequencer: Sequencer::new(config),
            io: Vec::new(),
            desired: Vec::new(),
            aggregate: None,
            any_open: false,
            link_up: None,
            deferred: 0,
            tick_count: 0,
        }
    }

    // ── Setup ─────────────────────────────────────────────────

    /// Register a circuit and bind its sinks.  Setup-time only.
    ///
    /// Returns `None` when the circuit table is full.
    pub fn register_circuit(
        &mut self,
        name: &str,
        valve: Option<Box<dyn ValveOutput>>,
        status: Option<Box<dyn IndicatorSink>>,
        motion: Option<Box<dyn IndicatorSink>>,
        inverted: bool,
    ) -> Option<CircuitId> {
        let Some(id) = self.sequencer.register(name, inverted) else {
            warn!("Circuit '{}': circuit table full, not registered", name);
            return None;
        };
        self.io.push(CircuitIo {
            valve,
            status,
            motion,
        });
        self.desired.push(false);
        Some(id)
    }

    /// Bind the "any circuit open" indicator.
    pub fn set_aggregate_sink(&mut self, sink: Box<dyn IndicatorSink>) {
        self.aggregate = Some(sink);
    }

    /// Log the effective configuration.
    pub fn dump_config(&self) {
        let cfg = self.sequencer.config();
        info!("ValveSequencer:");
        info!("  Number of circuits: {}", self.sequencer.circuits().len());
        info!("  Max concurrent valves: {}", cfg.max_concurrent_open);
        info!("  Valve open time: {} ms", cfg.open_duration_ms);
        for c in self.sequencer.circuits().iter() {
            info!(
                "  Circuit {} '{}'{}",
                c.id(),
                c.name(),
                if c.inverted() { " (inverted)" } else { "" }
            );
        }
        if self.sequencer.capacity() == 0 {
            warn!("  Max concurrent valves <= 0: no circuit will ever open");
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every valve off and publish both indicators false.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let intents = self.sequencer.idle_intents();
        self.apply(&intents);
        let circuits = self.sequencer.circuits().len();
        sink.emit(&AppEvent::Started { circuits });
        info!("ValveSequencer started with {} circuits", circuits);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one sequencing cycle.  Never blocks.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        link: &impl LinkPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let now = clock.now_ms();
        let link_up = link.is_link_up();

        if self.link_up != Some(link_up) {
            if link_up {
                info!("Command source reachable, accepting commands");
            } else {
                warn!("Command source unreachable, holding current valve states");
            }
            self.link_up = Some(link_up);
            sink.emit(&AppEvent::LinkChanged(link_up));
        }

        let desired = &self.desired;
        let outcome = self
            .sequencer
            .tick(now, link_up, |id| desired.get(id.index()).copied().unwrap_or(false));

        self.apply(&outcome.intents);

        for t in &outcome.transitions {
            self.report(*t, sink);
        }

        if outcome.deferred != self.deferred {
            if outcome.deferred > 0 {
                debug!(
                    "{} open request(s) waiting for a free slot ({} max)",
                    outcome.deferred,
                    self.sequencer.capacity()
                );
            }
            self.deferred = outcome.deferred;
        }

        if outcome.any_open != self.any_open {
            self.any_open = outcome.any_open;
            sink.emit(&AppEvent::AggregateChanged(outcome.any_open));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Record an external command.  Takes effect on the next tick with
    /// the link up.
    pub fn handle_command(&mut self, cmd: AppCommand) {
        match cmd {
            AppCommand::SetCircuit { circuit, open } => match self.desired.get_mut(circuit.index()) {
                Some(slot) => {
                    debug!("Circuit {}: desired {}", circuit, if open { "open" } else { "closed" });
                    *slot = open;
                }
                None => warn!("Ignoring command for unknown circuit {}", circuit),
            },
            AppCommand::CloseAll => {
                info!("Close requested for all circuits");
                self.desired.iter_mut().for_each(|d| *d = false);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Id of the circuit registered at `index`.
    pub fn circuit_at(&self, index: usize) -> Option<CircuitId> {
        self.sequencer.circuits().id_at(index)
    }

    pub fn circuits(&self) -> &CircuitStore {
        self.sequencer.circuits()
    }

    /// Commanded state for `id` (false for unknown ids).
    pub fn desired(&self, id: CircuitId) -> bool {
        self.desired.get(id.index()).copied().unwrap_or(false)
    }

    /// Aggregate value published on the last tick.
    pub fn any_open(&self) -> bool {
        self.any_open
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Build a telemetry snapshot of the last settled tick.
    pub fn build_telemetry(&self) -> TelemetryData {
        let circuits = self
            .sequencer
            .circuits()
            .iter()
            .map(|c| CircuitTelemetry {
                id: c.id(),
                name: crate::config::truncated_name(c.name()),
                desired_open: self.desired(c.id()),
                state: c.state(),
            })
            .collect();
        TelemetryData {
            circuits,
            opening: self.sequencer.circuits().opening_count(),
            any_open: self.any_open,
            link_up: self.link_up.unwrap_or(false),
            tick_count: self.tick_count,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate sequencer intents into port calls.
    fn apply(&mut self, intents: &[Intent]) {
        for intent in intents {
            match *intent {
                Intent::Drive { circuit, level } => {
                    if let Some(valve) = self.io_mut(circuit).and_then(|io| io.valve.as_mut()) {
                        valve.drive(level);
                    }
                }
                Intent::Status { circuit, open } => {
                    if let Some(s) = self.io_mut(circuit).and_then(|io| io.status.as_mut()) {
                        s.publish(open);
                    }
                }
                Intent::Motion { circuit, moving } => {
                    if let Some(s) = self.io_mut(circuit).and_then(|io| io.motion.as_mut()) {
                        s.publish(moving);
                    }
                }
                Intent::Aggregate(any_open) => {
                    if let Some(s) = self.aggregate.as_mut() {
                        s.publish(any_open);
                    }
                }
            }
        }
    }

    fn io_mut(&mut self, id: CircuitId) -> Option<&mut CircuitIo> {
        self.io.get_mut(id.index())
    }

    fn report(&self, transition: Transition, sink: &mut impl EventSink) {
        let name = |id: CircuitId| self.sequencer.circuits().get(id).map_or("?", |c| c.name());
        match transition {
            Transition::OpenStarted(id) => {
                info!("Circuit '{}': Starting open process.", name(id));
                sink.emit(&AppEvent::OpenStarted(id));
            }
            Transition::OpenCompleted(id) => {
                info!("Circuit '{}': Open process finished.", name(id));
                sink.emit(&AppEvent::OpenCompleted(id));
            }
            Transition::Closed { circuit, from } => {
                info!("Circuit '{}': Closing valve.", name(circuit));
                sink.emit(&AppEvent::Closed { circuit, from });
            }
        }
    }
}
