//! State shared by every mode handler.
//!
//! `WorkerContext` owns the peripherals, the decode buffers and the two
//! interrupt bridges, and borrows the caller's key for the duration of a
//! session.  Mode handlers receive `&mut WorkerContext` and destructure
//! it so disjoint fields can be borrowed at the same time.

use std::sync::Arc;

use crate::app::events::WriteResult;
use crate::app::ports::{Board, Peripherals};
use crate::config::WorkerConfig;
use crate::guard::ResourceGuard;
use crate::key::{KEY_MAX_SIZE, Key};
use crate::onewire::{CompletionLatch, OneWireDevice};
use crate::pulse::capture::EdgeCapture;

/// Called once with the freshly read key.
pub type ReadCallback<'k> = Box<dyn FnMut(&Key) + Send + 'k>;
/// Called on every Write tick with the mapped writer result.
pub type WriteCallback<'k> = Box<dyn FnMut(WriteResult) + Send + 'k>;
/// Called once per completed reader transaction while emulating.
pub type EmulateCallback<'k> = Box<dyn FnMut(bool) + Send + 'k>;

/// Optional result callbacks.  Registration allocates; dispatch does not.
#[derive(Default)]
pub struct WorkerCallbacks<'k> {
    pub read: Option<ReadCallback<'k>>,
    pub write: Option<WriteCallback<'k>>,
    pub emulate: Option<EmulateCallback<'k>>,
}

pub struct WorkerContext<'k, B: Board> {
    // -- Collaborators --
    pub hw: Peripherals<B>,
    pub guard: ResourceGuard,

    // -- Configuration --
    pub config: WorkerConfig,

    // -- Session --
    /// Caller-owned key.  The borrow outlives every session it is used in.
    pub key: Option<&'k mut Key>,
    pub callbacks: WorkerCallbacks<'k>,

    // -- Buffers --
    /// Scratch id filled by the ROM search or the pulse decoder.
    pub key_data: [u8; KEY_MAX_SIZE],
    /// Identity presented by the slave driver.
    pub device: OneWireDevice,
    /// True while the slave driver has `device` attached.
    pub slave_attached: bool,

    // -- Interrupt bridges --
    pub edges: Arc<EdgeCapture>,
    pub emulate_done: Arc<CompletionLatch>,
}

impl<'k, B: Board> WorkerContext<'k, B> {
    pub fn new(hw: Peripherals<B>, config: WorkerConfig) -> Self {
        Self {
            hw,
            guard: ResourceGuard::new(),
            config,
            key: None,
            callbacks: WorkerCallbacks::default(),
            key_data: [0; KEY_MAX_SIZE],
            device: OneWireDevice::default(),
            slave_attached: false,
            edges: Arc::new(EdgeCapture::new()),
            emulate_done: Arc::new(CompletionLatch::new()),
        }
    }

    /// The session key.  A mode that needs a key and has none is a
    /// programming error: halt rather than report on garbage.
    pub fn session_key(&self) -> &Key {
        expect_key(self.key.as_deref())
    }

    pub fn require_key(&self) {
        self.session_key();
    }
}

pub(super) fn expect_key<K>(key: Option<K>) -> K {
    match key {
        Some(key) => key,
        None => panic!("worker mode requires a key but none was provided"),
    }
}
