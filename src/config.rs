//! Worker timing parameters
//!
//! Quanta bound how long the host loop waits for a request before running
//! the active mode's tick.  The settle and sampling delays are plain
//! blocking waits inside the Read tick and are never cut short by a
//! pending request.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timing configuration for the worker engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    // --- Quanta ---
    /// Read mode: wait between polling attempts (milliseconds)
    pub read_quantum_ms: u32,
    /// Write mode: wait between write attempts (milliseconds)
    pub write_quantum_ms: u32,
    /// Emulate mode: wait between completion checks (milliseconds)
    pub emulate_quantum_ms: u32,

    // --- Read attempt ---
    /// Bus settle time after starting the 1-Wire host (milliseconds)
    pub dallas_settle_ms: u32,
    /// Comparator sampling window for pulse protocols (milliseconds)
    pub sample_window_ms: u32,
    /// Edge queue drain period inside the sampling window (milliseconds)
    pub edge_drain_slice_ms: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            // Quanta
            read_quantum_ms: 100,
            write_quantum_ms: 1000,
            emulate_quantum_ms: 1000,

            // Read attempt
            dallas_settle_ms: 100,
            sample_window_ms: 100,
            edge_drain_slice_ms: 10,
        }
    }
}

impl WorkerConfig {
    /// Reject values that would stall or spin the worker.
    pub fn validate(&self) -> Result<()> {
        if self.read_quantum_ms == 0 || self.write_quantum_ms == 0 || self.emulate_quantum_ms == 0
        {
            return Err(Error::Config("quantum must be non-zero"));
        }
        if self.sample_window_ms == 0 {
            return Err(Error::Config("sample window must be non-zero"));
        }
        if self.edge_drain_slice_ms == 0 || self.edge_drain_slice_ms > self.sample_window_ms {
            return Err(Error::Config("drain slice must be within the sample window"));
        }
        Ok(())
    }
}
