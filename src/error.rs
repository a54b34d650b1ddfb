//! Unified error types for the valve sequencer firmware.
//!
//! The sequencing core itself never fails; these types cover everything
//! around it (configuration, actuator pins, the command console).  All variants are `Copy` so they can be passed
//! through the main loop without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// A console line could not be understood.
    Console(ConsoleError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Console(e) => write!(f, "console: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The pin exists but could not be configured as an output.
    ConfigureFailed,
    /// The GPIO number does not name an output-capable pin.
    InvalidPin,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigureFailed => write!(f, "GPIO configuration failed"),
            Self::InvalidPin => write!(f, "invalid output pin"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Console errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// Blank line.
    Empty,
    /// First word is not a known verb.
    UnknownVerb,
    /// Verb needs a circuit index and none was given.
    MissingArgument,
    /// Circuit index is not a non-negative integer.
    BadCircuitIndex,
    /// Extra words after a complete command.
    TrailingInput,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::UnknownVerb => write!(f, "unknown command"),
            Self::MissingArgument => write!(f, "missing circuit index"),
            Self::BadCircuitIndex => write!(f, "circuit index must be a number"),
            Self::TrailingInput => write!(f, "unexpected trailing input"),
        }
    }
}

impl From<ConsoleError> for Error {
    fn from(e: ConsoleError) -> Self {
        Self::Console(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
