//! Requests into the worker and the mailbox that carries them.
//!
//! ```text
//! ┌──────────────┐  WorkerMessage  ┌──────────────────┐
//! │  Supervisor  │───────────────▶│  WorkerService   │
//! │  (any task)  │   (depth 4)     │  (worker thread) │
//! └──────────────┘                 └──────────────────┘
//! ```
//!
//! Posting never blocks.  A full mailbox is reported to the sender and
//! the request is dropped.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TryReceiveError};
use log::warn;

use crate::error::{MailboxError, Result};
use crate::key::Key;

/// Mailbox depth.
pub const MAILBOX_DEPTH: usize = 4;

/// Requests the worker thread understands.  Key-carrying variants lend
/// the caller's key to the worker until the next request replaces it.
#[derive(Debug)]
pub enum WorkerMessage<'k> {
    Read(&'k mut Key),
    Write(&'k mut Key),
    Emulate(&'k mut Key),
    /// Return to Idle.
    Stop,
    /// Return to Idle and leave the service loop.
    End,
}

impl WorkerMessage<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Read(_) => "Read",
            Self::Write(_) => "Write",
            Self::Emulate(_) => "Emulate",
            Self::Stop => "Stop",
            Self::End => "End",
        }
    }
}

/// Bounded request queue between any number of senders and the worker.
pub struct WorkerMailbox<'k> {
    channel: Channel<CriticalSectionRawMutex, WorkerMessage<'k>, MAILBOX_DEPTH>,
}

impl Default for WorkerMailbox<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'k> WorkerMailbox<'k> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Queue `msg` without blocking.
    pub fn post(&self, msg: WorkerMessage<'k>) -> Result<()> {
        self.channel.try_send(msg).map_err(|_| {
            warn!("mailbox: full, request dropped");
            MailboxError::Full.into()
        })
    }

    pub fn read(&self, key: &'k mut Key) -> Result<()> {
        self.post(WorkerMessage::Read(key))
    }

    pub fn write(&self, key: &'k mut Key) -> Result<()> {
        self.post(WorkerMessage::Write(key))
    }

    pub fn emulate(&self, key: &'k mut Key) -> Result<()> {
        self.post(WorkerMessage::Emulate(key))
    }

    pub fn stop(&self) -> Result<()> {
        self.post(WorkerMessage::Stop)
    }

    pub fn end(&self) -> Result<()> {
        self.post(WorkerMessage::End)
    }

    /// Requests waiting to be handled.
    pub fn pending(&self) -> usize {
        self.channel.len()
    }

    /// Take the next request if one is queued.
    pub(crate) fn try_take(&self) -> Option<WorkerMessage<'k>> {
        match self.channel.try_receive() {
            Ok(msg) => Some(msg),
            Err(TryReceiveError::Empty) => None,
        }
    }

    /// Block the calling thread until a request arrives.
    pub(crate) fn take_blocking(&self) -> WorkerMessage<'k> {
        futures_lite::future::block_on(self.channel.receive())
    }
}
