//! Outbound result codes.
//!
//! [`WriterOutcome`] is what a [`KeyWriter`](super::ports::KeyWriter)
//! reports; [`WriteResult`] is what the worker hands to the write callback.

/// Raw outcome of one key-writer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterOutcome {
    Ok,
    /// Target already holds identical data; nothing written.
    SameKey,
    /// No writable target on the contact.
    NoDetect,
    /// Target present but the write was rejected.
    CannotWrite,
    /// Driver-specific code the worker does not recognise.
    Other(u8),
}

/// Result reported through the write callback on every Write tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Ok,
    SameKey,
    NoDetect,
    CannotWrite,
}

impl From<WriterOutcome> for WriteResult {
    fn from(outcome: WriterOutcome) -> Self {
        match outcome {
            WriterOutcome::Ok => Self::Ok,
            WriterOutcome::SameKey => Self::SameKey,
            WriterOutcome::NoDetect => Self::NoDetect,
            WriterOutcome::CannotWrite => Self::CannotWrite,
            // Unknown outcomes are reported as "nothing there".
            WriterOutcome::Other(_) => Self::NoDetect,
        }
    }
}

impl WriteResult {
    /// True when the target now holds the key.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::SameKey)
    }
}
