//! Port traits: the boundary between the worker engine and its collaborators.
//!
//! ```text
//!   Driver ──▶ Port trait ──▶ Worker (engine)
//! ```
//!
//! Bus drivers, the pulse decoder, the key writer and the board-level
//! power/pin control implement these traits.  The engine is generic over a
//! [`Board`] that names one concrete type per port, so it never touches
//! hardware directly and runs unchanged against mocks on the host.
//!
//! ## Context rules
//!
//! Every method is called from the worker's task context.  The only
//! values handed to interrupt handlers are the lock-free bridges
//! ([`EdgeCapture`] and [`CompletionLatch`]).

use std::sync::Arc;

use crate::key::Key;
use crate::onewire::{CompletionLatch, OneWireDevice, SearchMode};
use crate::pulse::PulseProtocol;
use crate::pulse::capture::EdgeCapture;

use super::events::WriterOutcome;

// ───────────────────────────────────────────────────────────────
// Pulse decoder
// ───────────────────────────────────────────────────────────────

/// Decodes the two comparator-based protocols from pulse timings.
pub trait PulseDecoder {
    fn reset(&mut self);

    /// Feed one pulse: input `level` after the edge, `length` in cycles.
    fn process_pulse(&mut self, level: bool, length: u32);

    /// Protocol that has decoded a full frame, if any.
    fn decoded_index(&self) -> Option<PulseProtocol>;

    /// Copy the decoded bytes of `protocol` into `out`.
    fn get_data(&self, protocol: PulseProtocol, out: &mut [u8]);
}

// ───────────────────────────────────────────────────────────────
// 1-Wire host (reader side)
// ───────────────────────────────────────────────────────────────

pub trait OneWireHost {
    fn start(&mut self);
    fn stop(&mut self);

    /// Run one step of the ROM search.  On success the discovered id is
    /// written to `rom` and `true` is returned.
    fn search(&mut self, rom: &mut [u8], mode: SearchMode) -> bool;

    fn reset_search(&mut self);

    /// Bus reset.  Returns `true` if a presence pulse was seen.
    fn reset(&mut self) -> bool;

    fn write(&mut self, byte: u8);
    fn read(&mut self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// 1-Wire slave (emulation side)
// ───────────────────────────────────────────────────────────────

pub trait OneWireSlave {
    fn attach(&mut self, device: OneWireDevice);
    fn detach(&mut self);
    fn start(&mut self);
    fn stop(&mut self);

    /// Hand the driver the latch it signals after each completed reader
    /// transaction.  The driver may signal it from interrupt context.
    fn set_result_callback(&mut self, latch: Arc<CompletionLatch>);
}

// ───────────────────────────────────────────────────────────────
// Key writer
// ───────────────────────────────────────────────────────────────

/// Writes a stored key onto a blank / rewritable tag.
pub trait KeyWriter {
    /// Make one complete write attempt.
    fn write(&mut self, key: &Key) -> WriterOutcome;
}

// ───────────────────────────────────────────────────────────────
// Board-level control
// ───────────────────────────────────────────────────────────────

/// External power rail feeding the key contact.
pub trait PowerRail {
    fn enable(&mut self);
    fn disable(&mut self);
}

/// Analog front end: comparator plus the two RFID lines it shares.
pub trait RfidFrontEnd {
    /// Drive the pull and carrier lines to their safe inactive level.
    fn release_lines(&mut self);

    /// Return all front-end lines to their default electrical state.
    fn reset_pins(&mut self);

    /// Install the edge capture the comparator ISR feeds.  The ISR must
    /// call [`EdgeCapture::on_edge`] and nothing else.
    fn attach_edge_capture(&mut self, capture: Arc<EdgeCapture>);

    fn detach_edge_capture(&mut self);

    fn comparator_start(&mut self);
    fn comparator_stop(&mut self);
}

/// Monotonic cycle counter and blocking delay.
pub trait Clock {
    /// Free-running cycle counter (wraps).
    fn cycles(&self) -> u32;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Board bundle
// ───────────────────────────────────────────────────────────────

/// Names the concrete collaborator types of one hardware platform.
pub trait Board {
    type Host: OneWireHost;
    type Slave: OneWireSlave;
    type Decoder: PulseDecoder;
    type Writer: KeyWriter;
    type Power: PowerRail;
    type FrontEnd: RfidFrontEnd;
    type Clock: Clock;
}

/// One instance of every collaborator, owned by the worker.
///
/// Fields are public so the engine can borrow them disjointly.
pub struct Peripherals<B: Board> {
    pub host: B::Host,
    pub slave: B::Slave,
    pub decoder: B::Decoder,
    pub writer: B::Writer,
    pub power: B::Power,
    pub front_end: B::FrontEnd,
    pub clock: B::Clock,
}
