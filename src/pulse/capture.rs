//! Comparator edge capture, the interrupt side of pulse decoding.
//!
//! The comparator ISR calls [`EdgeCapture::on_edge`] with the input level
//! and the current cycle count.  The handler only measures the time since
//! the previous edge and pushes a packed `(level, duration)` word into a
//! lock-free SPSC ring; all decoding happens in task context when the Read
//! tick drains the ring into the pulse decoder.
//!
//! ```text
//! ┌──────────────┐  on_edge   ┌──────────────┐   drain   ┌──────────────┐
//! │ Comparator   │───────────▶│ EdgeCapture  │──────────▶│ PulseDecoder │
//! │ ISR          │            │ (lock-free)  │           │ (task)       │
//! └──────────────┘            └──────────────┘           └──────────────┘
//! ```
//!
//! Every slot is an `AtomicU32` so no `unsafe` is needed: the producer
//! writes the slot, then publishes it with a `Release` store of `head`;
//! the consumer `Acquire`s `head` before reading the slot.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Ring capacity.  Power of 2 for efficient modulo.
pub const EDGE_QUEUE_CAP: usize = 256;

const LEVEL_BIT: u32 = 1 << 31;
const DURATION_MASK: u32 = LEVEL_BIT - 1;

/// One captured comparator edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Input level after the edge.
    pub level: bool,
    /// Cycles since the previous edge.
    pub duration: u32,
}

impl EdgeEvent {
    fn pack(self) -> u32 {
        let level = if self.level { LEVEL_BIT } else { 0 };
        level | self.duration.min(DURATION_MASK)
    }

    fn unpack(raw: u32) -> Self {
        Self {
            level: raw & LEVEL_BIT != 0,
            duration: raw & DURATION_MASK,
        }
    }
}

/// Single-producer (ISR) / single-consumer (worker task) edge queue.
pub struct EdgeCapture {
    slots: [AtomicU32; EDGE_QUEUE_CAP],
    head: AtomicUsize,
    tail: AtomicUsize,
    /// Cycle count of the most recent edge.
    last_edge: AtomicU32,
    /// Edges dropped because the ring was full.
    overruns: AtomicU32,
}

impl Default for EdgeCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeCapture {
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicU32::new(0) }; EDGE_QUEUE_CAP],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            last_edge: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    /// Reset the ring and seed the edge timestamp.
    ///
    /// Call from task context before the comparator is started, never
    /// while the ISR may be running.
    pub fn arm(&self, now_cycles: u32) {
        self.tail.store(self.head.load(Ordering::Acquire), Ordering::Release);
        self.last_edge.store(now_cycles, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
    }

    /// Record one comparator edge.  ISR context; bounded and lock-free.
    pub fn on_edge(&self, level: bool, now_cycles: u32) {
        let prev = self.last_edge.swap(now_cycles, Ordering::Relaxed);
        let event = EdgeEvent {
            level,
            duration: now_cycles.wrapping_sub(prev),
        };

        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let next_head = (head + 1) % EDGE_QUEUE_CAP;

        if next_head == tail {
            self.overruns.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.slots[head].store(event.pack(), Ordering::Relaxed);
        self.head.store(next_head, Ordering::Release);
    }

    /// Pop the oldest edge.  Task context only.
    pub fn pop(&self) -> Option<EdgeEvent> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let raw = self.slots[tail].load(Ordering::Relaxed);
        self.tail.store((tail + 1) % EDGE_QUEUE_CAP, Ordering::Release);
        Some(EdgeEvent::unpack(raw))
    }

    /// Feed every pending edge to `handler` in FIFO order.
    /// Returns the number of edges drained.
    pub fn drain(&self, mut handler: impl FnMut(EdgeEvent)) -> usize {
        let mut count = 0;
        while let Some(event) = self.pop() {
            handler(event);
            count += 1;
        }
        count
    }

    /// Number of pending edges.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Relaxed);
        (head + EDGE_QUEUE_CAP - tail) % EDGE_QUEUE_CAP
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cycle count of the latest edge (or the arming time if none yet).
    pub fn last_edge(&self) -> u32 {
        self.last_edge.load(Ordering::Relaxed)
    }

    /// Return and reset the dropped-edge counter.
    pub fn take_overruns(&self) -> u32 {
        self.overruns.swap(0, Ordering::Relaxed)
    }
}
