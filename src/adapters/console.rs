//! Serial console command source.
//!
//! Line-oriented protocol read from UART / USB-CDC:
//!
//! ```text
//!   open <n>      request circuit n open
//!   close <n>     request circuit n closed
//!   close all     request every circuit closed
//!   ping          keep the link alive without changing anything
//!   status        print a telemetry snapshot
//! ```
//!
//! Lines are read on a dedicated thread and handed to the main loop over
//! a channel, so the loop never blocks on input.  Every parsed line counts
//! as a heartbeat for [`HeartbeatLink`](super::link::HeartbeatLink).

use std::io::BufRead;
use std::sync::mpsc;

use log::{info, warn};

use crate::app::commands::AppCommand;
use crate::circuit::CircuitId;
use crate::error::ConsoleError;

/// A parsed console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Open(usize),
    Close(usize),
    CloseAll,
    Ping,
    Status,
}

impl ConsoleCommand {
    /// Translate into an application command.  `None` for commands the
    /// service does not handle (`ping`, `status`) and for unknown circuit
    /// indices.
    pub fn app_command(self, circuit_at: impl Fn(usize) -> Option<CircuitId>) -> Option<AppCommand> {
        match self {
            Self::Open(index) => circuit_at(index).map(|circuit| AppCommand::SetCircuit { circuit, open: true }),
            Self::Close(index) => circuit_at(index).map(|circuit| AppCommand::SetCircuit { circuit, open: false }),
            Self::CloseAll => Some(AppCommand::CloseAll),
            Self::Ping | Self::Status => None,
        }
    }
}

/// Parse one console line.  Verbs are case-insensitive.
pub fn parse_line(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(ConsoleError::Empty)?;

    let cmd = if verb.eq_ignore_ascii_case("open") {
        ConsoleCommand::Open(parse_index(words.next())?)
    } else if verb.eq_ignore_ascii_case("close") {
        match words.next() {
            Some(arg) if arg.eq_ignore_ascii_case("all") => ConsoleCommand::CloseAll,
            arg => ConsoleCommand::Close(parse_index(arg)?),
        }
    } else if verb.eq_ignore_ascii_case("ping") {
        ConsoleCommand::Ping
    } else if verb.eq_ignore_ascii_case("status") {
        ConsoleCommand::Status
    } else {
        return Err(ConsoleError::UnknownVerb);
    };

    if words.next().is_some() {
        return Err(ConsoleError::TrailingInput);
    }
    Ok(cmd)
}

fn parse_index(arg: Option<&str>) -> Result<usize, ConsoleError> {
    arg.ok_or(ConsoleError::MissingArgument)?
        .parse()
        .map_err(|_| ConsoleError::BadCircuitIndex)
}

/// Read lines from `input` on a background thread.  The returned receiver
/// yields every successfully parsed command; bad lines are logged and
/// dropped.  The thread ends at end of input or when the receiver is
/// dropped.
pub fn spawn_reader<R>(input: R) -> std::io::Result<mpsc::Receiver<ConsoleCommand>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(8192)
        .spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else {
                    warn!("Console: read error, stopping reader");
                    break;
                };
                match parse_line(&line) {
                    Ok(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(ConsoleError::Empty) => {}
                    Err(e) => warn!("Console: '{}': {}", line.trim(), e),
                }
            }
            info!("Console: reader finished");
        })?;
    Ok(rx)
}

/// Non-blocking view of the reader channel for the main loop.
///
/// Once the reader thread is gone (end of input, read error) no further
/// heartbeats can arrive; that is logged once rather than passing
/// silently as an empty channel.
pub struct ConsoleFeed {
    rx: mpsc::Receiver<ConsoleCommand>,
    closed: bool,
}

impl ConsoleFeed {
    pub fn new(rx: mpsc::Receiver<ConsoleCommand>) -> Self {
        Self { rx, closed: false }
    }

    /// Next pending command, if any.  Never blocks.
    pub fn poll(&mut self) -> Option<ConsoleCommand> {
        match self.rx.try_recv() {
            Ok(cmd) => Some(cmd),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                if !self.closed {
                    self.closed = true;
                    warn!("Console: input closed, no further commands; link will time out");
                }
                None
            }
        }
    }

    /// True once the reader has stopped and the channel is drained.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
