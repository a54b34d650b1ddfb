//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | tick={} | link={} | opening={} | any_open={}",
                    t.tick_count,
                    if t.link_up { "UP" } else { "DOWN" },
                    t.opening,
                    t.any_open,
                );
                for c in &t.circuits {
                    info!(
                        "TELEM |   {} '{}' want={} state={:?}",
                        c.id,
                        c.name,
                        if c.desired_open { "open" } else { "closed" },
                        c.state,
                    );
                }
            }
            AppEvent::OpenStarted(id) => info!("VALVE | {} opening", id),
            AppEvent::OpenCompleted(id) => info!("VALVE | {} open", id),
            AppEvent::Closed { circuit, from } => {
                info!("VALVE | {} closed (was {:?})", circuit, from);
            }
            AppEvent::AggregateChanged(any_open) => {
                info!("AGGR  | any circuit open = {}", any_open);
            }
            AppEvent::LinkChanged(up) => {
                info!("LINK  | {}", if *up { "up" } else { "down" });
            }
            AppEvent::Started { circuits } => {
                info!("START | circuits={}", circuits);
            }
        }
    }
}
