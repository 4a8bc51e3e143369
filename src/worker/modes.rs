//! Mode handlers.
//!
//! Every mode has a `start`, a `tick` and a `stop`.  `tick` returns
//! `Some(next)` when the mode wants to hand over to another one.
//!
//! ```text
//!  IDLE ──[read(key)]──▶ READ ──[key found]──▶ IDLE
//!    │                     │
//!    ├──[write(key)]──▶ WRITE     (ticks until stop)
//!    │
//!    └──[emulate(key)]─▶ EMULATE  (ticks until stop)
//!
//!  Any mode ──[stop / end]──▶ IDLE
//! ```

use std::sync::Arc;

use log::{debug, info, warn};

use super::WorkerMode;
use super::context::{WorkerContext, expect_key};
use crate::app::events::WriteResult;
use crate::app::ports::{
    Board, Clock, KeyWriter, OneWireHost, OneWireSlave, PulseDecoder, RfidFrontEnd,
};
use crate::guard::with_host_session;
use crate::key::{KEY_MAX_SIZE, KeyType};
use crate::onewire::{DS1990_CMD_READ_ROM, SearchMode};

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE mode
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn idle_start<B: Board>(_ctx: &mut WorkerContext<'_, B>) {}

pub(super) fn idle_tick<B: Board>(_ctx: &mut WorkerContext<'_, B>) -> Option<WorkerMode> {
    None
}

pub(super) fn idle_stop<B: Board>(_ctx: &mut WorkerContext<'_, B>) {}

// ═══════════════════════════════════════════════════════════════════════════
//  READ mode
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn read_start<B: Board>(ctx: &mut WorkerContext<'_, B>) {
    ctx.require_key();
    ctx.guard.power_up(&mut ctx.hw.power);
}

/// One read attempt: 1-Wire first, comparator protocols second.  Both
/// are tried within the same tick.
pub(super) fn read_tick<B: Board>(ctx: &mut WorkerContext<'_, B>) -> Option<WorkerMode> {
    let key_type = read_dallas(ctx).or_else(|| read_comparator(ctx))?;

    let WorkerContext {
        key,
        callbacks,
        key_data,
        ..
    } = ctx;
    let key = expect_key(key.as_deref_mut());
    key.assign(key_type, key_data);
    info!("READ: {} key {:02X?}", key_type.name(), key.payload());

    if let Some(cb) = callbacks.read.as_mut() {
        cb(&*key);
    }
    Some(WorkerMode::Idle)
}

pub(super) fn read_stop<B: Board>(ctx: &mut WorkerContext<'_, B>) {
    ctx.guard.power_down(&mut ctx.hw.power);
}

/// Search the bus for one device and confirm it with READ ROM.  The
/// search and the confirmation run with interrupts masked.
fn read_dallas<B: Board>(ctx: &mut WorkerContext<'_, B>) -> Option<KeyType> {
    let settle_ms = ctx.config.dallas_settle_ms;
    let WorkerContext { hw, key_data, .. } = ctx;
    let (host, clock) = (&mut hw.host, &mut hw.clock);

    let valid = with_host_session(host, |host| {
        clock.delay_ms(settle_ms);
        critical_section::with(|_| {
            let found = host.search(&mut key_data[..], SearchMode::Normal);
            host.reset_search();
            found && verify_rom(host, &key_data[..])
        })
    });

    if valid {
        debug!("READ: 1-Wire id {:02X?} confirmed", key_data);
        Some(KeyType::Dallas)
    } else {
        None
    }
}

/// Reset, issue READ ROM and compare the bytes read back against `rom`.
/// Stops at the first mismatch to keep the masked section short.
fn verify_rom(host: &mut impl OneWireHost, rom: &[u8]) -> bool {
    if !host.reset() {
        return false;
    }
    host.write(DS1990_CMD_READ_ROM);
    rom.iter().all(|&expected| host.read() == expected)
}

/// Sample the comparator for one window and feed every edge to the
/// pulse decoder.
fn read_comparator<B: Board>(ctx: &mut WorkerContext<'_, B>) -> Option<KeyType> {
    let WorkerContext {
        hw,
        config,
        key_data,
        edges,
        ..
    } = ctx;

    hw.decoder.reset();
    hw.front_end.release_lines();
    edges.arm(hw.clock.cycles());
    hw.front_end.attach_edge_capture(Arc::clone(edges));
    hw.front_end.comparator_start();

    let slice = config.edge_drain_slice_ms.max(1);
    let mut remaining = config.sample_window_ms;
    let mut pulses = 0usize;
    while remaining > 0 {
        let step = remaining.min(slice);
        hw.clock.delay_ms(step);
        pulses += edges.drain(|edge| hw.decoder.process_pulse(edge.level, edge.duration));
        remaining -= step;
    }

    hw.front_end.comparator_stop();
    hw.front_end.detach_edge_capture();
    // Edges that raced the stop.
    pulses += edges.drain(|edge| hw.decoder.process_pulse(edge.level, edge.duration));

    let decoded = hw.decoder.decoded_index();
    if let Some(protocol) = decoded {
        *key_data = [0; KEY_MAX_SIZE];
        hw.decoder.get_data(protocol, &mut key_data[..]);
    }
    hw.front_end.reset_pins();

    let overruns = edges.take_overruns();
    if overruns > 0 {
        warn!("READ: edge queue overran, {overruns} edges dropped");
    }
    debug!("READ: comparator window saw {pulses} pulses");

    decoded.map(KeyType::from)
}

// ═══════════════════════════════════════════════════════════════════════════
//  EMULATE mode
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn emulate_start<B: Board>(ctx: &mut WorkerContext<'_, B>) {
    let key = *ctx.session_key();
    ctx.emulate_done.clear();

    match key.key_type() {
        KeyType::Dallas => {
            *ctx.device.id_mut() = *key.data();
            let slave = &mut ctx.hw.slave;
            slave.attach(ctx.device);
            // Hook before start so a transaction right after start is not lost.
            slave.set_result_callback(Arc::clone(&ctx.emulate_done));
            slave.start();
            ctx.slave_attached = true;
            info!("EMULATE: presenting {:02X?}", key.payload());
        }
        KeyType::Cyfral | KeyType::Metakom => {
            info!("EMULATE: {} keys cannot be emulated, staying passive", key.key_type().name());
        }
    }
}

/// Report every reader transaction completed since the last tick.
pub(super) fn emulate_tick<B: Board>(ctx: &mut WorkerContext<'_, B>) -> Option<WorkerMode> {
    let completed = ctx.emulate_done.take();
    if completed > 0 {
        debug!("EMULATE: {completed} reader transaction(s)");
        if let Some(cb) = ctx.callbacks.emulate.as_mut() {
            for _ in 0..completed {
                cb(true);
            }
        }
    }
    None
}

pub(super) fn emulate_stop<B: Board>(ctx: &mut WorkerContext<'_, B>) {
    if ctx.slave_attached {
        ctx.hw.slave.stop();
        ctx.hw.slave.detach();
        ctx.slave_attached = false;
    }
    ctx.emulate_done.clear();
}

// ═══════════════════════════════════════════════════════════════════════════
//  WRITE mode
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn write_start<B: Board>(ctx: &mut WorkerContext<'_, B>) {
    ctx.require_key();
    ctx.guard.power_up(&mut ctx.hw.power);
    ctx.guard.host_start(&mut ctx.hw.host);
}

/// One write attempt per tick.  The result is reported every time,
/// including `SameKey` once the target already holds the key.
pub(super) fn write_tick<B: Board>(ctx: &mut WorkerContext<'_, B>) -> Option<WorkerMode> {
    let WorkerContext { hw, key, callbacks, .. } = ctx;
    let key = expect_key(key.as_deref());

    let result = WriteResult::from(hw.writer.write(key));
    if result == WriteResult::CannotWrite {
        warn!("WRITE: target rejected the write");
    } else {
        debug!("WRITE: {result:?}");
    }

    if let Some(cb) = callbacks.write.as_mut() {
        cb(result);
    }
    None
}

pub(super) fn write_stop<B: Board>(ctx: &mut WorkerContext<'_, B>) {
    ctx.guard.host_stop(&mut ctx.hw.host);
    ctx.guard.power_down(&mut ctx.hw.power);
}
