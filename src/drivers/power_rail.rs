//! External power rail switch.
//!
//! One GPIO drives the load switch feeding the key contact.  Pin errors
//! are logged and otherwise ignored: a rail that failed to switch shows
//! up as a read or write that finds nothing.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::PowerRail;

pub struct GpioPowerRail<P> {
    pin: P,
    active_high: bool,
    enabled: bool,
}

impl<P: OutputPin> GpioPowerRail<P> {
    /// Rail switched on by driving `pin` high.
    pub fn new(pin: P) -> Self {
        Self::with_polarity(pin, true)
    }

    pub fn with_polarity(pin: P, active_high: bool) -> Self {
        Self {
            pin,
            active_high,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, on: bool) {
        let result = if on == self.active_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            warn!("power rail: pin did not switch {}", if on { "on" } else { "off" });
        }
        self.enabled = on;
    }
}

impl<P: OutputPin> PowerRail for GpioPowerRail<P> {
    fn enable(&mut self) {
        self.drive(true);
    }

    fn disable(&mut self) {
        self.drive(false);
    }
}
