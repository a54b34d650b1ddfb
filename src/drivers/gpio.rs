//! Raw GPIO output pins.
//!
//! [`GpioPin`] configures one pin as a push-pull output and exposes it
//! through the `embedded-hal` [`OutputPin`] trait so that
//! [`RelayValve`](super::relay::RelayValve) works with it and with any
//! other HAL's pins alike.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `gpio_config` / `gpio_set_level`.
//! On host/test: tracks the level in-memory only.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use log::info;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::ActuatorError;

/// Highest GPIO number on the ESP32 family that can drive an output.
pub const MAX_OUTPUT_GPIO: i32 = 48;

/// ESP-IDF error code from a failed pin write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub i32);

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct GpioPin {
    pin: i32,
    #[cfg(not(target_os = "espidf"))]
    level: bool,
}

impl GpioPin {
    /// Configure `pin` as an output driven to `initial` immediately, so the
    /// relay never glitches through the wrong level at boot.
    pub fn output(pin: i32, initial: bool) -> Result<Self, ActuatorError> {
        if !(0..=MAX_OUTPUT_GPIO).contains(&pin) {
            return Err(ActuatorError::InvalidPin);
        }

        #[cfg(target_os = "espidf")]
        {
            let cfg = gpio_config_t {
                pin_bit_mask: 1u64 << pin,
                mode: gpio_mode_t_GPIO_MODE_OUTPUT,
                pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
                pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
                intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
            };
            // SAFETY: pin number range-checked above; called from the
            // single main-task setup path.
            let ret = unsafe {
                gpio_set_level(pin, u32::from(initial));
                gpio_config(&cfg)
            };
            if ret != ESP_OK as i32 {
                return Err(ActuatorError::ConfigureFailed);
            }
        }

        info!("gpio: GPIO{} configured as output ({})", pin, if initial { "HIGH" } else { "LOW" });
        Ok(Self {
            pin,
            #[cfg(not(target_os = "espidf"))]
            level: initial,
        })
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    #[cfg(target_os = "espidf")]
    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        // SAFETY: pin was configured as output in `output()`. Main-loop only.
        let ret = unsafe { gpio_set_level(self.pin, u32::from(high)) };
        if ret == ESP_OK as i32 { Ok(()) } else { Err(GpioError(ret)) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        self.level = high;
        Ok(())
    }

    /// Level last written (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn level(&self) -> bool {
        self.level
    }
}

impl ErrorType for GpioPin {
    type Error = GpioError;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}
