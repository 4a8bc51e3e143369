//! RFID pull and carrier lines.
//!
//! The comparator front end shares its input with the 125 kHz reader.
//! Before sampling, the pull line and the carrier output must be parked
//! low so the reader circuitry does not load the contact; afterwards both
//! return to their idle level.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct RfidLines<PULL, CARRIER> {
    pull: PULL,
    carrier: CARRIER,
}

impl<PULL: OutputPin, CARRIER: OutputPin> RfidLines<PULL, CARRIER> {
    pub fn new(pull: PULL, carrier: CARRIER) -> Self {
        Self { pull, carrier }
    }

    /// Park both lines low.
    pub fn release(&mut self) {
        let pull = self.pull.set_low();
        let carrier = self.carrier.set_low();
        if pull.is_err() || carrier.is_err() {
            warn!("rfid lines: failed to park");
        }
    }

    /// Return both lines to their idle (high) level.
    pub fn reset(&mut self) {
        let pull = self.pull.set_high();
        let carrier = self.carrier.set_high();
        if pull.is_err() || carrier.is_err() {
            warn!("rfid lines: failed to reset");
        }
    }

    pub fn pins(&self) -> (&PULL, &CARRIER) {
        (&self.pull, &self.carrier)
    }
}
