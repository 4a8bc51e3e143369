//! Worker mode engine.
//!
//! The worker is always in exactly one [`WorkerMode`].  Each mode has a
//! start, a tick and a stop action (see [`modes`]) and a [`Quantum`]: the
//! longest the host loop waits for a request before ticking the mode.
//!
//! ```text
//!  ┌──────────┬────────────┬───────────────────────────────────┐
//!  │ Mode     │ Quantum    │ tick                              │
//!  ├──────────┼────────────┼───────────────────────────────────┤
//!  │ Idle     │ forever    │ nothing                           │
//!  │ Read     │ 100 ms     │ 1-Wire search, then comparator    │
//!  │ Write    │ 1000 ms    │ one writer attempt                │
//!  │ Emulate  │ 1000 ms    │ report reader transactions        │
//!  └──────────┴────────────┴───────────────────────────────────┘
//! ```
//!
//! A mode change always runs `stop(old)` before `start(new)`, even when
//! the old and new mode are the same.  All calls happen on the thread
//! that owns the [`Worker`].

pub mod context;
mod modes;

use log::info;

use crate::app::events::WriteResult;
use crate::app::ports::{Board, Clock, Peripherals};
use crate::config::WorkerConfig;
use crate::error::Result;
use crate::key::Key;
use context::WorkerContext;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerMode {
    Idle,
    Read,
    Write,
    Emulate,
}

impl WorkerMode {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Read => "Read",
            Self::Write => "Write",
            Self::Emulate => "Emulate",
        }
    }

    /// Wait budget of this mode under `config`.
    pub fn quantum(self, config: &WorkerConfig) -> Quantum {
        match self {
            Self::Idle => Quantum::Forever,
            Self::Read => Quantum::Millis(config.read_quantum_ms),
            Self::Write => Quantum::Millis(config.write_quantum_ms),
            Self::Emulate => Quantum::Millis(config.emulate_quantum_ms),
        }
    }
}

/// How long the host loop may block waiting for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantum {
    Forever,
    Millis(u32),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The mode engine.  `'k` is the lifetime of the caller's key and of the
/// registered callbacks.
pub struct Worker<'k, B: Board> {
    mode: WorkerMode,
    ctx: WorkerContext<'k, B>,
}

impl<'k, B: Board> Worker<'k, B> {
    /// Worker with the default timing, starting in `Idle`.
    pub fn new(hw: Peripherals<B>) -> Self {
        Self::build(hw, WorkerConfig::default())
    }

    pub fn with_config(hw: Peripherals<B>, config: WorkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(hw, config))
    }

    fn build(hw: Peripherals<B>, config: WorkerConfig) -> Self {
        info!("worker: created in Idle");
        Self {
            mode: WorkerMode::Idle,
            ctx: WorkerContext::new(hw, config),
        }
    }

    // -----------------------------------------------------------------------
    // Callbacks and key
    // -----------------------------------------------------------------------

    pub fn set_read_callback(&mut self, cb: impl FnMut(&Key) + Send + 'k) {
        self.ctx.callbacks.read = Some(Box::new(cb));
    }

    pub fn set_write_callback(&mut self, cb: impl FnMut(WriteResult) + Send + 'k) {
        self.ctx.callbacks.write = Some(Box::new(cb));
    }

    pub fn set_emulate_callback(&mut self, cb: impl FnMut(bool) + Send + 'k) {
        self.ctx.callbacks.emulate = Some(Box::new(cb));
    }

    /// Install the key used by the next mode start.
    pub fn set_key(&mut self, key: &'k mut Key) {
        self.ctx.key = Some(key);
    }

    pub fn key(&self) -> Option<&Key> {
        self.ctx.key.as_deref()
    }

    // -----------------------------------------------------------------------
    // Mode control
    // -----------------------------------------------------------------------

    pub fn mode(&self) -> WorkerMode {
        self.mode
    }

    pub fn quantum(&self) -> Quantum {
        self.mode.quantum(&self.ctx.config)
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.ctx.config
    }

    /// `stop(current)` then `start(next)`.
    pub fn switch_mode(&mut self, next: WorkerMode) {
        self.switch_with_key(next, None);
    }

    /// Run the current mode's tick once, following any transition it asks for.
    pub fn tick(&mut self) {
        let next = match self.mode {
            WorkerMode::Idle => modes::idle_tick(&mut self.ctx),
            WorkerMode::Read => modes::read_tick(&mut self.ctx),
            WorkerMode::Write => modes::write_tick(&mut self.ctx),
            WorkerMode::Emulate => modes::emulate_tick(&mut self.ctx),
        };
        if let Some(next) = next {
            self.switch_mode(next);
        }
    }

    /// Start reading into `key`.
    pub fn read(&mut self, key: &'k mut Key) {
        self.switch_with_key(WorkerMode::Read, Some(key));
    }

    /// Start writing `key` onto a blank.
    pub fn write(&mut self, key: &'k mut Key) {
        self.switch_with_key(WorkerMode::Write, Some(key));
    }

    /// Start presenting `key` to a reader.
    pub fn emulate(&mut self, key: &'k mut Key) {
        self.switch_with_key(WorkerMode::Emulate, Some(key));
    }

    /// Return to `Idle`.
    pub fn stop(&mut self) {
        self.switch_mode(WorkerMode::Idle);
    }

    // -----------------------------------------------------------------------
    // Peripherals
    // -----------------------------------------------------------------------

    pub fn peripherals(&self) -> &Peripherals<B> {
        &self.ctx.hw
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<B> {
        &mut self.ctx.hw
    }

    /// Block on the board clock.  Used by the host loop between polls.
    pub(crate) fn delay_ms(&mut self, ms: u32) {
        self.ctx.hw.clock.delay_ms(ms);
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// The old mode is stopped before a new key is installed so its stop
    /// action still sees the session it started.
    fn switch_with_key(&mut self, next: WorkerMode, key: Option<&'k mut Key>) {
        info!("worker transition: {} -> {}", self.mode.name(), next.name());

        self.stop_mode(self.mode);

        if let Some(key) = key {
            self.ctx.key = Some(key);
        }
        self.mode = next;

        self.start_mode(next);
    }

    fn start_mode(&mut self, mode: WorkerMode) {
        match mode {
            WorkerMode::Idle => modes::idle_start(&mut self.ctx),
            WorkerMode::Read => modes::read_start(&mut self.ctx),
            WorkerMode::Write => modes::write_start(&mut self.ctx),
            WorkerMode::Emulate => modes::emulate_start(&mut self.ctx),
        }
    }

    fn stop_mode(&mut self, mode: WorkerMode) {
        match mode {
            WorkerMode::Idle => modes::idle_stop(&mut self.ctx),
            WorkerMode::Read => modes::read_stop(&mut self.ctx),
            WorkerMode::Write => modes::write_stop(&mut self.ctx),
            WorkerMode::Emulate => modes::emulate_stop(&mut self.ctx),
        }
    }
}
