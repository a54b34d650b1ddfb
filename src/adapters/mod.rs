//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                   |
//! |-------------|----------------|-------------------------------|
//! | `console`   | (command feed) | UART / USB-CDC line input     |
//! | `indicator` | IndicatorSink  | Shared flags, serial log      |
//! | `link`      | LinkPort       | Shared flag, heartbeat timer  |
//! | `log_sink`  | EventSink      | Serial log output             |
//! | `nvs`       | ConfigPort     | NVS / in-memory store         |
//! | `time`      | ClockPort      | ESP32 system timer            |
//!
//! The valve relay adapter lives in [`crate::drivers::relay`].

pub mod console;
pub mod indicator;
pub mod link;
pub mod log_sink;
pub mod nvs;
pub mod time;
