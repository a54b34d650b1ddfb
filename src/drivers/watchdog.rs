//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the sequencing loop stalls.  A stalled loop would
//! leave valves opening past their modelled travel time and stop honoring
//! close commands, so the main loop calls [`Watchdog::feed`] every tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

/// Default stall timeout.
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: core::cell::Cell<u64>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task during setup.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self {
                    timeout_ms,
                    subscribed,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): {} ms timeout, no-op", timeout_ms);
            Self {
                timeout_ms,
                feeds: core::cell::Cell::new(0),
            }
        }
    }

    /// Timeout derived for a given loop cadence: ten missed ticks, but
    /// never below [`DEFAULT_TIMEOUT_MS`].
    pub fn timeout_for_loop(loop_interval_ms: u32) -> u32 {
        loop_interval_ms.saturating_mul(10).max(DEFAULT_TIMEOUT_MS)
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: the current task is subscribed.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        self.feeds.set(self.feeds.get() + 1);
    }

    /// Feeds so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn feed_count(&self) -> u64 {
        self.feeds.get()
    }
}
