//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SequencerService (domain)
//! ```
//!
//! Driven adapters (valve relays, indicator sinks, clock, link, event
//! sinks, config storage) implement these traits.  The
//! [`SequencerService`](super::service::SequencerService) consumes them,
//! so the sequencing core never touches hardware directly.

use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// Actuator and indicator ports (domain → hardware / host)
// ───────────────────────────────────────────────────────────────

/// A binary-drivable valve actuator.
pub trait ValveOutput {
    /// Set the physical output level.  Polarity is already resolved by
    /// the caller; `true` means drive the pin HIGH.
    fn drive(&mut self, level: bool);
}

/// A fire-and-forget boolean publisher (status, motion, aggregate).
///
/// Called every tick for the aggregate indicator, so implementations
/// must tolerate repeated identical values.
pub trait IndicatorSink {
    fn publish(&mut self, value: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock and link ports (outside world → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond counter.  Wraps at `u32::MAX`; consumers must
/// compare with `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

impl<C: ClockPort + ?Sized> ClockPort for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Whether the upstream command source is currently authoritative.
pub trait LinkPort {
    fn is_link_up(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid values are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("stored config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::IoError => Self::Config("config storage I/O error"),
        }
    }
}
