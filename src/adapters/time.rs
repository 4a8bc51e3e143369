//! Monotonic clock adapter.
//!
//! Implements [`Clock`] for the worker: a wrapping cycle counter for pulse
//! timing and a blocking millisecond delay.
//!
//! - **`feature = "espidf"` on `target_os = "espidf"`**: derives cycles
//!   from `esp_timer_get_time()` and delays through FreeRTOS so other
//!   tasks keep running.
//! - **otherwise**: uses `std::time::Instant` and `std::thread::sleep`
//!   for host-side testing and simulation.

use crate::app::ports::Clock;

/// Default CPU clock of the ESP32 family.
pub const DEFAULT_CYCLES_PER_US: u32 = 240;

pub struct SystemClock {
    cycles_per_us: u32,
    #[cfg(not(all(target_os = "espidf", feature = "espidf")))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLES_PER_US)
    }
}

impl SystemClock {
    pub fn new(cycles_per_us: u32) -> Self {
        Self {
            cycles_per_us: cycles_per_us.max(1),
            #[cfg(not(all(target_os = "espidf", feature = "espidf")))]
            start: std::time::Instant::now(),
        }
    }

    pub fn cycles_per_us(&self) -> u32 {
        self.cycles_per_us
    }

    /// Microseconds since boot (monotonic).
    #[cfg(all(target_os = "espidf", feature = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(all(target_os = "espidf", feature = "espidf")))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for SystemClock {
    fn cycles(&self) -> u32 {
        // Truncation is the wrap.
        self.uptime_us().wrapping_mul(u64::from(self.cycles_per_us)) as u32
    }

    #[cfg(all(target_os = "espidf", feature = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(all(target_os = "espidf", feature = "espidf")))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
