//! Worker service: the loop run by the worker thread.
//!
//! [`WorkerService`] owns a [`Worker`] and listens on a
//! [`WorkerMailbox`].  Each iteration waits for a request for at most the
//! current mode's quantum.  A request is applied immediately; a timeout
//! runs one tick of the current mode.
//!
//! ```text
//!  WorkerMailbox ──▶ ┌──────────────────────┐
//!                    │    WorkerService     │ ──▶ callbacks
//!      quantum  ──▶  │  wait · apply · tick │
//!                    └──────────────────────┘
//! ```

use core::ops::ControlFlow;

use log::{debug, info};

use crate::app::ports::Board;
use crate::worker::{Quantum, Worker};

use super::commands::{WorkerMailbox, WorkerMessage};

/// Granularity of the mailbox poll while a finite quantum runs down.
pub const POLL_SLICE_MS: u32 = 10;

// ───────────────────────────────────────────────────────────────
// WorkerService
// ───────────────────────────────────────────────────────────────

pub struct WorkerService<'m, 'k, B: Board> {
    worker: Worker<'k, B>,
    mailbox: &'m WorkerMailbox<'k>,
    handled: u64,
}

impl<'m, 'k, B: Board> WorkerService<'m, 'k, B> {
    pub fn new(worker: Worker<'k, B>, mailbox: &'m WorkerMailbox<'k>) -> Self {
        Self {
            worker,
            mailbox,
            handled: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Serve requests until `End` is received.  The worker is back in
    /// Idle when this returns.
    pub fn run(&mut self) {
        info!("worker service: running");
        loop {
            let next = match self.worker.quantum() {
                Quantum::Forever => Some(self.mailbox.take_blocking()),
                Quantum::Millis(ms) => self.wait_for_message(ms),
            };

            match next {
                Some(msg) => {
                    if self.handle_message(msg).is_break() {
                        break;
                    }
                }
                None => self.worker.tick(),
            }
        }
        info!("worker service: ended after {} requests", self.handled);
    }

    /// Apply one request to the worker.
    pub fn handle_message(&mut self, msg: WorkerMessage<'k>) -> ControlFlow<()> {
        self.handled += 1;
        debug!("worker service: {} request", msg.name());
        match msg {
            WorkerMessage::Read(key) => self.worker.read(key),
            WorkerMessage::Write(key) => self.worker.write(key),
            WorkerMessage::Emulate(key) => self.worker.emulate(key),
            WorkerMessage::Stop => self.worker.stop(),
            WorkerMessage::End => {
                self.worker.stop();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn worker(&self) -> &Worker<'k, B> {
        &self.worker
    }

    pub fn worker_mut(&mut self) -> &mut Worker<'k, B> {
        &mut self.worker
    }

    /// Requests applied so far.
    pub fn handled(&self) -> u64 {
        self.handled
    }

    pub fn into_worker(self) -> Worker<'k, B> {
        self.worker
    }

    // ── Internal ──────────────────────────────────────────────

    /// Poll the mailbox for up to `quantum_ms`, sleeping on the board
    /// clock between polls.
    fn wait_for_message(&mut self, quantum_ms: u32) -> Option<WorkerMessage<'k>> {
        let mut remaining = quantum_ms;
        loop {
            if let Some(msg) = self.mailbox.try_take() {
                return Some(msg);
            }
            if remaining == 0 {
                return None;
            }
            let step = remaining.min(POLL_SLICE_MS);
            self.worker.delay_ms(step);
            remaining -= step;
        }
    }
}
