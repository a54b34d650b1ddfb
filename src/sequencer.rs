//! Admission-controlled valve sequencing core.
//!
//! One [`Sequencer::tick`] evaluates every circuit in three ordered passes:
//!
//! ```text
//!   ┌───────────────┐   ┌─────────────────────┐   ┌──────────────────┐
//!   │ 1. Completion │──▶│ 2. Command intake   │──▶│ 3. Aggregate     │
//!   │ Opening → Open│   │ (only if link up)   │   │ any_open publish │
//!   │ after timeout │   │ close now / admit   │   │ every tick       │
//!   └───────────────┘   └─────────────────────┘   └──────────────────┘
//! ```
//!
//! The tick is pure: it mutates circuit state and returns [`Intent`]s that
//! describe the drive and publish calls the caller must perform.  It never
//! blocks and never fails.
//!
//! Only opening is rate-limited: at most `max_concurrent_open` circuits may
//! be `Opening` at once.  The opening count is recomputed by full scan for
//! every candidate, so admission is greedy in registration order and lower
//! indices always win ties.  Closing is immediate and uncapped.

use crate::circuit::{CircuitId, CircuitState, CircuitStore, drive_level, opening_count};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Immutable sequencing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Values `<= 0` mean no circuit may ever open.
    pub max_concurrent_open: i32,
    /// Modelled valve travel time.  A transition completes once strictly
    /// more than this many milliseconds have elapsed since admission.
    pub open_duration_ms: u32,
}

// ---------------------------------------------------------------------------
// Tick output
// ---------------------------------------------------------------------------

/// A side effect requested by the sequencer, in the order it must be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Set the valve output to this physical level (polarity already applied).
    Drive { circuit: CircuitId, level: bool },
    /// Publish the circuit's "fully open" indicator.
    Status { circuit: CircuitId, open: bool },
    /// Publish the circuit's "moving" indicator.
    Motion { circuit: CircuitId, moving: bool },
    /// Publish the "any circuit open" indicator.
    Aggregate(bool),
}

/// A state change that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Open command admitted; valve is now travelling.
    OpenStarted(CircuitId),
    /// Travel time elapsed; valve is now open.
    OpenCompleted(CircuitId),
    /// Close command honored; `from` is the state before closing.
    Closed { circuit: CircuitId, from: CircuitState },
}

/// Everything one tick produced.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub intents: Vec<Intent>,
    pub transitions: Vec<Transition>,
    /// Open requests held back by the concurrency cap this tick.
    pub deferred: usize,
    /// Value published to the aggregate indicator.
    pub any_open: bool,
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

pub struct Sequencer {
    config: SequencerConfig,
    store: CircuitStore,
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            store: CircuitStore::new(),
        }
    }

    /// Register a circuit.  Setup-time only; see [`CircuitStore::register`].
    pub fn register(&mut self, name: &str, inverted: bool) -> Option<CircuitId> {
        self.store.register(name, inverted)
    }

    pub fn config(&self) -> SequencerConfig {
        self.config
    }

    pub fn circuits(&self) -> &CircuitStore {
        &self.store
    }

    /// Effective cap; never negative.
    pub fn capacity(&self) -> usize {
        usize::try_from(self.config.max_concurrent_open).unwrap_or(0)
    }

    /// Intents that put every output into the idle state: drive off and
    /// both indicators false.  Used once at startup.
    pub fn idle_intents(&self) -> Vec<Intent> {
        let mut intents = Vec::with_capacity(self.store.len() * 3);
        for c in self.store.iter() {
            let circuit = c.id();
            intents.push(Intent::Drive {
                circuit,
                level: drive_level(false, c.inverted()),
            });
            intents.push(Intent::Status { circuit, open: false });
            intents.push(Intent::Motion { circuit, moving: false });
        }
        intents
    }

    /// Advance every circuit by one tick.
    ///
    /// * `now` — monotonic milliseconds; may wrap.
    /// * `link_up` — whether the command source is authoritative.  While
    ///   false no command (open or close) is honored, but transitions
    ///   already in progress still complete.
    /// * `desired` — requested open state per circuit.
    pub fn tick(
        &mut self,
        now: u32,
        link_up: bool,
        desired: impl Fn(CircuitId) -> bool,
    ) -> TickOutcome {
        let mut out = TickOutcome::default();
        let open_duration = self.config.open_duration_ms;
        let cap = self.capacity();
        let circuits = self.store.as_mut_slice();

        // ── Pass 1: transition completion ─────────────────────
        for c in circuits.iter_mut() {
            if let CircuitState::Opening { since } = c.state {
                if now.wrapping_sub(since) > open_duration {
                    c.state = CircuitState::Open;
                    let circuit = c.id();
                    // Drive stays on: held-open uses the moving level.
                    out.intents.push(Intent::Motion { circuit, moving: false });
                    out.intents.push(Intent::Status { circuit, open: true });
                    out.transitions.push(Transition::OpenCompleted(circuit));
                }
            }
        }

        // ── Pass 2: command intake ────────────────────────────
        if link_up {
            for i in 0..circuits.len() {
                let circuit = circuits[i].id();
                let want_open = desired(circuit);
                let state = circuits[i].state;

                if !want_open && state.is_energised() {
                    circuits[i].state = CircuitState::Closed;
                    out.intents.push(Intent::Drive {
                        circuit,
                        level: drive_level(false, circuits[i].inverted()),
                    });
                    out.intents.push(Intent::Status { circuit, open: false });
                    out.intents.push(Intent::Motion { circuit, moving: false });
                    out.transitions.push(Transition::Closed { circuit, from: state });
                } else if want_open && state == CircuitState::Closed {
                    if opening_count(circuits) < cap {
                        let c = &mut circuits[i];
                        c.state = CircuitState::Opening { since: now };
                        out.intents.push(Intent::Drive {
                            circuit,
                            level: drive_level(true, c.inverted()),
                        });
                        out.intents.push(Intent::Motion { circuit, moving: true });
                        out.transitions.push(Transition::OpenStarted(circuit));
                    } else {
                        out.deferred += 1;
                    }
                }
            }
        }

        // ── Pass 3: aggregate ─────────────────────────────────
        out.any_open = circuits.iter().any(|c| c.state.is_open());
        out.intents.push(Intent::Aggregate(out.any_open));

        out
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
