//! Circuit records and the append-only circuit store.
//!
//! A circuit's transition state is a single enum value, so "open and
//! opening at the same time" cannot be represented.  The physical drive
//! level is derived from that state plus the polarity flag; there is no
//! separately stored drive state that could disagree with it.

use heapless::{String, Vec};
use serde::Serialize;

use crate::config::{CIRCUIT_NAME_LEN, truncated_name};

/// Maximum number of circuits one sequencer manages.
///
/// The opening count is recomputed by a full scan for every admission
/// candidate, which is only cheap because this stays small.
pub const MAX_CIRCUITS: usize = 16;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable handle for a registered circuit (its registration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CircuitId(u8);

impl CircuitId {
    /// Registration index of this circuit.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for CircuitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Transition state
// ---------------------------------------------------------------------------

/// Per-circuit valve state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CircuitState {
    /// Valve closed, drive off.
    #[default]
    Closed,
    /// Open command admitted at `since` (ms); waiting for the valve to travel.
    Opening { since: u32 },
    /// Travel time elapsed, valve assumed fully open.
    Open,
}

impl CircuitState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_changing(self) -> bool {
        matches!(self, Self::Opening { .. })
    }

    /// Whether the actuator is logically energised.  The moving phase and
    /// the held-open phase share the same drive level.
    pub fn is_energised(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

// ---------------------------------------------------------------------------
// Circuit record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Circuit {
    id: CircuitId,
    name: String<CIRCUIT_NAME_LEN>,
    inverted: bool,
    pub(crate) state: CircuitState,
}

impl Circuit {
    pub fn id(&self) -> CircuitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Physical pin level for the current state (`energised XOR inverted`).
    pub fn drive_level(&self) -> bool {
        drive_level(self.state.is_energised(), self.inverted)
    }
}

/// Resolve a logical on/off into a physical pin level.
pub const fn drive_level(on: bool, inverted: bool) -> bool {
    on ^ inverted
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Ordered, append-only collection of circuits.
#[derive(Debug, Default)]
pub struct CircuitStore {
    circuits: Vec<Circuit, MAX_CIRCUITS>,
}

impl CircuitStore {
    pub fn new() -> Self {
        Self { circuits: Vec::new() }
    }

    /// Append a circuit in the `Closed` state.  Returns `None` once
    /// [`MAX_CIRCUITS`] circuits are registered.
    pub fn register(&mut self, name: &str, inverted: bool) -> Option<CircuitId> {
        let id = CircuitId(self.circuits.len() as u8);
        self.circuits
            .push(Circuit {
                id,
                name: truncated_name(name),
                inverted,
                state: CircuitState::Closed,
            })
            .ok()?;
        Some(id)
    }

    /// Look up the id registered at `index`, if any.
    pub fn id_at(&self, index: usize) -> Option<CircuitId> {
        self.circuits.get(index).map(|c| c.id)
    }

    pub fn get(&self, id: CircuitId) -> Option<&Circuit> {
        self.circuits.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Circuit> {
        self.circuits.iter()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Circuit] {
        &mut self.circuits
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// Number of circuits currently opening, by full scan.
    pub fn opening_count(&self) -> usize {
        opening_count(&self.circuits)
    }

    /// True if at least one circuit is fully open.
    pub fn any_open(&self) -> bool {
        self.circuits.iter().any(|c| c.state.is_open())
    }
}

pub(crate) fn opening_count(circuits: &[Circuit]) -> usize {
    circuits.iter().filter(|c| c.state.is_changing()).count()
}
