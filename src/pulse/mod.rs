//! Pulse-protocol decoding: protocol tags and the aggregating
//! [`PulseDecoderHub`].
//!
//! The hub fans every `(level, duration)` pulse out to each registered
//! [`ProtocolDecoder`] and reports the first one that has locked onto a
//! complete frame.  The per-protocol timing maths live in the individual
//! decoders; the hub only routes pulses and answers the worker's queries
//! through the [`PulseDecoder`] port.

pub mod capture;

use heapless::Vec;

use crate::app::ports::PulseDecoder;

/// Maximum number of protocol decoders a hub can hold.
pub const MAX_PROTOCOLS: usize = 4;

/// Comparator-decoded key protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PulseProtocol {
    Cyfral,
    Metakom,
}

/// One protocol's pulse decoder.
pub trait ProtocolDecoder {
    /// Forget all partial state.
    fn reset(&mut self);

    /// Consume one pulse: `level` after the edge and its `length` in cycles.
    fn process(&mut self, level: bool, length: u32);

    /// True once a complete, valid frame has been seen.
    fn decoded(&self) -> bool;

    /// Copy the decoded bytes into `out` (truncated to `out.len()`).
    fn get_data(&self, out: &mut [u8]);
}

struct Registered {
    protocol: PulseProtocol,
    decoder: Box<dyn ProtocolDecoder + Send>,
}

/// Routes pulses to every registered protocol decoder.
pub struct PulseDecoderHub {
    decoders: Vec<Registered, MAX_PROTOCOLS>,
}

impl Default for PulseDecoderHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseDecoderHub {
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Register a decoder for `protocol`.  A second registration for the
    /// same protocol replaces the first.  Returns the decoder back if the
    /// hub is full.
    pub fn register(
        &mut self,
        protocol: PulseProtocol,
        decoder: Box<dyn ProtocolDecoder + Send>,
    ) -> Result<(), Box<dyn ProtocolDecoder + Send>> {
        if let Some(slot) = self.decoders.iter_mut().find(|r| r.protocol == protocol) {
            slot.decoder = decoder;
            return Ok(());
        }
        self.decoders
            .push(Registered { protocol, decoder })
            .map_err(|r| r.decoder)
    }

    /// Number of registered decoders.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl PulseDecoder for PulseDecoderHub {
    fn reset(&mut self) {
        for r in &mut self.decoders {
            r.decoder.reset();
        }
    }

    fn process_pulse(&mut self, level: bool, length: u32) {
        for r in &mut self.decoders {
            r.decoder.process(level, length);
        }
    }

    fn decoded_index(&self) -> Option<PulseProtocol> {
        self.decoders
            .iter()
            .find(|r| r.decoder.decoded())
            .map(|r| r.protocol)
    }

    fn get_data(&self, protocol: PulseProtocol, out: &mut [u8]) {
        if let Some(r) = self.decoders.iter().find(|r| r.protocol == protocol) {
            r.decoder.get_data(out);
        }
    }
}
