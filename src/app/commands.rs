//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (console, home
//! automation bridge) that the
//! [`SequencerService`](super::service::SequencerService) records.  They
//! only update the desired state; whether it is acted upon is decided by
//! the next tick.

use crate::circuit::CircuitId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Request a circuit open (`true`) or closed (`false`).
    SetCircuit { circuit: CircuitId, open: bool },

    /// Request every circuit closed.
    CloseAll,
}
