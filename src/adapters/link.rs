//! Command-source link adapters.
//!
//! Implements [`LinkPort`], the gate that decides whether new commands
//! are honored.
//!
//! | Adapter         | Link is up while …                                   |
//! |-----------------|------------------------------------------------------|
//! | `SharedLink`    | some other task says so (network stack, API server)  |
//! | `HeartbeatLink` | the command source spoke within the last timeout     |

use core::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::app::ports::{ClockPort, LinkPort};

// ───────────────────────────────────────────────────────────────
// SharedLink
// ───────────────────────────────────────────────────────────────

/// A link flag that can be flipped from another task.  Clones share
/// the same flag.
#[derive(Debug, Clone, Default)]
pub struct SharedLink {
    up: Arc<AtomicBool>,
}

impl SharedLink {
    pub fn new(up: bool) -> Self {
        Self {
            up: Arc::new(AtomicBool::new(up)),
        }
    }

    pub fn set(&self, up: bool) {
        self.up.store(up, Ordering::Relaxed);
    }
}

impl LinkPort for SharedLink {
    fn is_link_up(&self) -> bool {
        self.up.load(Ordering::Relaxed)
    }
}

// ───────────────────────────────────────────────────────────────
// HeartbeatLink
// ───────────────────────────────────────────────────────────────

/// Link derived from command-source liveness.
///
/// Every received command (or explicit ping) refreshes the heartbeat.
/// The link is up until `timeout_ms` elapse without one.  Timestamps
/// come from the same wrapping clock as the sequencer.
///
/// Expiry is latched on the first poll past the timeout, so a stale
/// heartbeat never comes back into range when the clock wraps.  The
/// main loop polls every tick, far more often than the ~49.7 day wrap.
pub struct HeartbeatLink<C: ClockPort> {
    clock: C,
    timeout_ms: u32,
    last_seen: Cell<Option<u32>>,
}

impl<C: ClockPort> HeartbeatLink<C> {
    pub fn new(clock: C, timeout_ms: u32) -> Self {
        Self {
            clock,
            timeout_ms,
            last_seen: Cell::new(None),
        }
    }

    /// Record that the command source is alive.
    pub fn beat(&self) {
        if self.last_seen.get().is_none() {
            info!("HeartbeatLink: first contact from command source");
        }
        self.last_seen.set(Some(self.clock.now_ms()));
    }
}

impl<C: ClockPort> LinkPort for HeartbeatLink<C> {
    fn is_link_up(&self) -> bool {
        let Some(seen) = self.last_seen.get() else {
            return false;
        };
        if self.clock.now_ms().wrapping_sub(seen) <= self.timeout_ms {
            return true;
        }
        self.last_seen.set(None);
        warn!("HeartbeatLink: no contact for {} ms, link down", self.timeout_ms);
        false
    }
}
