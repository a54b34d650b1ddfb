//! Valve Sequencer Firmware — Main Entry Point
//!
//! Hexagonal architecture around a cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RelayValve(GpioPin)  LogIndicator     NvsAdapter  Esp32Time   │
//! │  (ValveOutput)        (IndicatorSink)  (Config)    (ClockPort) │
//! │  Console reader ──▶ HeartbeatLink (LinkPort)   LogEventSink    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │       SequencerService  ──▶  Sequencer (pure tick)     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use valve_sequencer::adapters::console::{self, ConsoleCommand, ConsoleFeed};
use valve_sequencer::adapters::indicator::LogIndicator;
use valve_sequencer::adapters::link::HeartbeatLink;
use valve_sequencer::adapters::log_sink::LogEventSink;
use valve_sequencer::adapters::nvs::{NvsAdapter, load_validated};
use valve_sequencer::adapters::time::Esp32TimeAdapter;
use valve_sequencer::app::events::AppEvent;
use valve_sequencer::app::ports::{ClockPort, EventSink, ValveOutput};
use valve_sequencer::app::service::SequencerService;
use valve_sequencer::circuit::drive_level;
use valve_sequencer::config::SystemConfig;
use valve_sequencer::drivers::gpio::GpioPin;
use valve_sequencer::drivers::relay::RelayValve;
use valve_sequencer::drivers::watchdog::Watchdog;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Valve Sequencer v{}              ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            NvsAdapter::default()
        }
    };
    let config = load_validated(&nvs).unwrap_or_else(|e| {
        warn!("Stored config unusable ({}), using defaults", e);
        SystemConfig::default()
    });
    if config.circuits.is_empty() {
        warn!("No circuits configured; the sequencer will idle");
    }

    // ── 3. Circuits: relay outputs + indicators ───────────────
    let time = Esp32TimeAdapter::new();
    let mut service = SequencerService::new(config.sequencer());
    service.set_aggregate_sink(Box::new(LogIndicator::new("Any valve open")));

    for c in &config.circuits {
        // Configure each pin straight into its idle level.
        let valve: Option<Box<dyn ValveOutput>> =
            match GpioPin::output(c.gpio, drive_level(false, c.inverted)) {
                Ok(pin) => Some(Box::new(RelayValve::new(pin, &c.name))),
                Err(e) => {
                    warn!("Circuit '{}': GPIO{} unusable ({}), running without output", c.name, c.gpio, e);
                    None
                }
            };
        let registered = service.register_circuit(
            &c.name,
            valve,
            Some(Box::new(LogIndicator::new(format!("{} Status", c.name)))),
            Some(Box::new(LogIndicator::new(format!("{} Moving", c.name)))),
            c.inverted,
        );
        if registered.is_none() {
            warn!("Circuit '{}' dropped: circuit table full", c.name);
        }
    }

    service.dump_config();

    // ── 4. Command source ─────────────────────────────────────
    let mut commands = ConsoleFeed::new(console::spawn_reader(std::io::BufReader::new(std::io::stdin()))?);
    let link = HeartbeatLink::new(&time, config.link_timeout_ms);

    // ── 5. Start ──────────────────────────────────────────────
    let mut sink = LogEventSink::new();
    service.start(&mut sink);
    let watchdog = Watchdog::new(Watchdog::timeout_for_loop(config.loop_interval_ms));

    let loop_interval = Duration::from_millis(u64::from(config.loop_interval_ms));
    let telemetry_interval_ms = config.telemetry_interval_secs.saturating_mul(1000);
    let mut last_telemetry = time.now_ms();

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        while let Some(cmd) = commands.poll() {
            link.beat();
            match cmd {
                ConsoleCommand::Status => match serde_json::to_string(&service.build_telemetry()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!("Status encode failed: {}", e),
                },
                ConsoleCommand::Ping => {}
                other => match other.app_command(|i| service.circuit_at(i)) {
                    Some(app_cmd) => service.handle_command(app_cmd),
                    None => warn!("Console: no such circuit ({:?})", other),
                },
            }
        }

        service.tick(&time, &link, &mut sink);

        let now = time.now_ms();
        if now.wrapping_sub(last_telemetry) >= telemetry_interval_ms {
            last_telemetry = now;
            sink.emit(&AppEvent::Telemetry(service.build_telemetry()));
        }

        watchdog.feed();
        std::thread::sleep(loop_interval);
    }
}
