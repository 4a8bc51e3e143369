//! Power and bus resource guard.
//!
//! Brackets the external power rail and the 1-Wire host driver around a
//! mode session.  Read and Write acquire in `start` and release in `stop`;
//! the guard remembers what it holds so every resource is switched on
//! exactly once per session and off exactly once, however many ticks run
//! in between.

use log::debug;

use crate::app::ports::{OneWireHost, PowerRail};

#[derive(Debug, Default)]
pub struct ResourceGuard {
    power_held: bool,
    host_held: bool,
}

impl ResourceGuard {
    pub const fn new() -> Self {
        Self {
            power_held: false,
            host_held: false,
        }
    }

    pub fn power_up(&mut self, rail: &mut impl PowerRail) {
        if !self.power_held {
            rail.enable();
            self.power_held = true;
            debug!("guard: power rail on");
        }
    }

    pub fn power_down(&mut self, rail: &mut impl PowerRail) {
        if self.power_held {
            rail.disable();
            self.power_held = false;
            debug!("guard: power rail off");
        }
    }

    pub fn host_start(&mut self, host: &mut impl OneWireHost) {
        if !self.host_held {
            host.start();
            self.host_held = true;
        }
    }

    pub fn host_stop(&mut self, host: &mut impl OneWireHost) {
        if self.host_held {
            host.stop();
            self.host_held = false;
        }
    }

    pub fn power_held(&self) -> bool {
        self.power_held
    }

    pub fn host_held(&self) -> bool {
        self.host_held
    }
}

/// Run one short host session: start the driver, run `f`, stop the
/// driver regardless of what `f` returned.
pub fn with_host_session<H: OneWireHost, R>(host: &mut H, f: impl FnOnce(&mut H) -> R) -> R {
    host.start();
    let result = f(host);
    host.stop();
    result
}
