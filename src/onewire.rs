//! 1-Wire protocol constants and the responder-side data the worker owns.
//!
//! Bus timing and the ROM search algorithm live in the host/slave drivers
//! behind [`OneWireHost`](crate::app::ports::OneWireHost) and
//! [`OneWireSlave`](crate::app::ports::OneWireSlave).

use core::sync::atomic::{AtomicU32, Ordering};

use crate::key::KEY_MAX_SIZE;

/// DS1990 "Read ROM" command (single-drop bus).
pub const DS1990_CMD_READ_ROM: u8 = 0x33;

/// ROM search flavour passed to the host driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Search every device on the bus (0xF0).
    Normal,
    /// Only devices in alarm state (0xEC).
    Conditional,
}

impl SearchMode {
    pub const fn command(self) -> u8 {
        match self {
            Self::Normal => 0xF0,
            Self::Conditional => 0xEC,
        }
    }
}

/// Identity presented by the slave driver while emulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OneWireDevice {
    id: [u8; KEY_MAX_SIZE],
}

impl OneWireDevice {
    pub const fn new(id: [u8; KEY_MAX_SIZE]) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &[u8; KEY_MAX_SIZE] {
        &self.id
    }

    pub fn id_mut(&mut self) -> &mut [u8; KEY_MAX_SIZE] {
        &mut self.id
    }

    /// Family code (first ROM byte).
    pub fn family(&self) -> u8 {
        self.id[0]
    }
}

/// Completion counter shared with the slave driver.
///
/// The driver calls [`signal`](Self::signal) from its interrupt path after a
/// reader finished a transaction against the emulated id.  The worker
/// drains it with [`take`](Self::take) from task context and dispatches the
/// emulate callback there.  Lock-free, so safe to call from an ISR.
#[derive(Debug, Default)]
pub struct CompletionLatch {
    pending: AtomicU32,
}

impl CompletionLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Record one completed transaction.  ISR-safe.
    pub fn signal(&self) {
        self.pending.fetch_add(1, Ordering::Release);
    }

    /// Return and reset the number of completions since the last call.
    pub fn take(&self) -> u32 {
        self.pending.swap(0, Ordering::Acquire)
    }

    /// Drop any completions left over from a previous session.
    pub fn clear(&self) {
        self.pending.store(0, Ordering::Release);
    }
}
