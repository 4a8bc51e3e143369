//! Read mode: 1-Wire search first, comparator protocols second.

use std::sync::{Arc, Mutex};

use ibutton_worker::key::{Key, KeyType};
use ibutton_worker::onewire::DS1990_CMD_READ_ROM;
use ibutton_worker::pulse::PulseProtocol;
use ibutton_worker::worker::{Quantum, Worker, WorkerMode};

use crate::mock_hw::{
    CYFRAL_DATA, CYFRAL_PULSE, CallLog, DALLAS_ID, HwCall, METAKOM_DATA, METAKOM_PULSE,
    PULSES_TO_LOCK, SimBoard, alternating_edges, sim_board,
};

fn reading_worker<'k>(seen: &Arc<Mutex<Vec<Key>>>) -> (Worker<'k, SimBoard>, CallLog) {
    let (hw, log) = sim_board();
    let mut worker = Worker::new(hw);
    let seen = Arc::clone(seen);
    worker.set_read_callback(move |key| seen.lock().unwrap().push(*key));
    (worker, log)
}

// ── Dallas ────────────────────────────────────────────────────

#[test]
fn dallas_key_read_once_then_idle() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::new(KeyType::Cyfral);
    let (mut worker, log) = reading_worker(&seen);
    worker.peripherals_mut().host.device = Some(DALLAS_ID);

    worker.read(&mut key);
    assert_eq!(worker.mode(), WorkerMode::Read);
    assert_eq!(worker.quantum(), Quantum::Millis(100));

    worker.tick();
    assert_eq!(worker.mode(), WorkerMode::Idle);
    assert_eq!(worker.quantum(), Quantum::Forever);

    // Further ticks in Idle never report again.
    worker.tick();
    worker.tick();
    assert_eq!(seen.lock().unwrap().len(), 1);

    let found = seen.lock().unwrap()[0];
    assert_eq!(found.key_type(), KeyType::Dallas);
    assert_eq!(found.data(), &DALLAS_ID);
    assert_eq!(worker.key(), Some(&found));

    let mut expected = vec![
        HwCall::PowerOn,
        HwCall::HostStart,
        HwCall::HostSearch,
        HwCall::HostResetSearch,
        HwCall::HostReset,
        HwCall::HostWrite(DS1990_CMD_READ_ROM),
    ];
    expected.extend([HwCall::HostRead; 8]);
    expected.extend([HwCall::HostStop, HwCall::PowerOff]);
    assert_eq!(log.snapshot(), expected);
}

#[test]
fn dallas_read_waits_for_bus_settle() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, _log) = reading_worker(&seen);
    worker.peripherals_mut().host.device = Some(DALLAS_ID);

    worker.read(&mut key);
    worker.tick();
    // Settle delay only: the comparator window is skipped on success.
    assert_eq!(worker.peripherals().clock.slept_ms, 100);
}

#[test]
fn rom_mismatch_falls_back_to_comparator_in_same_tick() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, log) = reading_worker(&seen);
    {
        let hw = worker.peripherals_mut();
        hw.host.device = Some(DALLAS_ID);
        let mut corrupted = DALLAS_ID;
        corrupted[3] ^= 0xFF;
        hw.host.read_back = Some(corrupted);
        hw.front_end.play(alternating_edges(PULSES_TO_LOCK + 4, CYFRAL_PULSE));
    }

    worker.read(&mut key);
    worker.tick();

    assert_eq!(worker.mode(), WorkerMode::Idle);
    let found = seen.lock().unwrap()[0];
    assert_eq!(found.key_type(), KeyType::Cyfral);
    assert_eq!(found.payload(), &CYFRAL_DATA);

    // Verification stops at the corrupted byte, and the host is released
    // before sampling starts.
    assert_eq!(log.count(HwCall::HostRead), 4);
    let host_stop = log.position(HwCall::HostStop).unwrap();
    let release = log.position(HwCall::LinesRelease).unwrap();
    assert!(host_stop < release);
}

#[test]
fn first_byte_mismatch_ends_verification() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, log) = reading_worker(&seen);
    {
        let hw = worker.peripherals_mut();
        hw.host.device = Some(DALLAS_ID);
        let mut corrupted = DALLAS_ID;
        corrupted[0] ^= 0xFF;
        hw.host.read_back = Some(corrupted);
    }

    worker.read(&mut key);
    worker.tick();

    assert_eq!(worker.mode(), WorkerMode::Read);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(log.count(HwCall::HostRead), 1);
    // The host session closes right after the short verification.
    let calls = log.snapshot();
    let read = log.position(HwCall::HostRead).unwrap();
    assert_eq!(calls[read + 1], HwCall::HostStop);
}

#[test]
fn no_presence_pulse_is_not_a_dallas_key() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, log) = reading_worker(&seen);
    {
        let hw = worker.peripherals_mut();
        hw.host.device = Some(DALLAS_ID);
        hw.host.presence = Some(false);
    }

    worker.read(&mut key);
    worker.tick();

    assert_eq!(worker.mode(), WorkerMode::Read);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(log.count(HwCall::HostWrite(DS1990_CMD_READ_ROM)), 0);
    assert_eq!(log.count(HwCall::ComparatorStart), 1);
}

// ── Comparator protocols ──────────────────────────────────────

#[test]
fn nothing_on_contact_keeps_reading() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, log) = reading_worker(&seen);

    worker.read(&mut key);
    for _ in 0..3 {
        worker.tick();
    }

    assert_eq!(worker.mode(), WorkerMode::Read);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(log.count(HwCall::HostSearch), 3);
    assert_eq!(log.count(HwCall::ComparatorStart), 3);
    assert_eq!(log.count(HwCall::PowerOn), 1);
    assert_eq!(log.count(HwCall::PowerOff), 0);
    // Key is untouched while nothing is found.
    assert_eq!(worker.key(), Some(&Key::default()));
}

#[test]
fn comparator_attempt_sequence() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, log) = reading_worker(&seen);

    worker.read(&mut key);
    log.clear();
    worker.tick();

    let calls = log.snapshot();
    let analog: Vec<HwCall> = calls.into_iter().filter(|c| !c.is_bus_or_power()).collect();
    assert_eq!(
        analog,
        vec![
            HwCall::DecoderReset,
            HwCall::LinesRelease,
            HwCall::CaptureAttach,
            HwCall::ComparatorStart,
            HwCall::ComparatorStop,
            HwCall::CaptureDetach,
            HwCall::LinesReset,
        ]
    );

    let hw = worker.peripherals();
    assert!(!hw.front_end.sampling);
    assert!(!hw.front_end.capture_attached());
    let (pull, carrier) = hw.front_end.lines.pins();
    assert_eq!((pull.level, carrier.level), (Some(true), Some(true)));
    // Settle delay plus the full sampling window.
    assert_eq!(hw.clock.slept_ms, 200);
}

#[test]
fn metakom_fixture_decodes() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::with_data(KeyType::Dallas, &[0xEE; 8]).unwrap();
    let (mut worker, log) = reading_worker(&seen);
    worker
        .peripherals_mut()
        .front_end
        .play(alternating_edges(PULSES_TO_LOCK * 2, METAKOM_PULSE));

    worker.read(&mut key);
    worker.tick();

    assert_eq!(worker.mode(), WorkerMode::Idle);
    assert_eq!(log.count(HwCall::DecoderGetData(PulseProtocol::Metakom)), 1);

    let found = seen.lock().unwrap()[0];
    assert_eq!(found.key_type(), KeyType::Metakom);
    assert_eq!(found.payload(), &METAKOM_DATA);
    // Stale bytes from the previous key are not carried over.
    assert_eq!(&found.data()[4..], &[0, 0, 0, 0]);
    assert_eq!(worker.peripherals().decoder.pulses, PULSES_TO_LOCK * 2);
}

#[test]
fn pulse_timing_survives_cycle_counter_wrap() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, _log) = reading_worker(&seen);
    {
        let hw = worker.peripherals_mut();
        let base = u32::MAX - 3 * CYFRAL_PULSE;
        hw.clock.cycles = base;
        hw.front_end.base_cycles = base;
        hw.front_end.play(alternating_edges(PULSES_TO_LOCK, CYFRAL_PULSE));
    }

    worker.read(&mut key);
    worker.tick();

    assert_eq!(seen.lock().unwrap()[0].key_type(), KeyType::Cyfral);
}

#[test]
fn noisy_pulses_do_not_decode() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, _log) = reading_worker(&seen);
    // Lengths between the two protocols' windows.
    worker
        .peripherals_mut()
        .front_end
        .play(alternating_edges(PULSES_TO_LOCK * 2, 1_500));

    worker.read(&mut key);
    worker.tick();

    assert_eq!(worker.mode(), WorkerMode::Read);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn edge_overrun_keeps_what_fit() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, _log) = reading_worker(&seen);
    worker
        .peripherals_mut()
        .front_end
        .play(alternating_edges(400, CYFRAL_PULSE));

    worker.read(&mut key);
    worker.tick();

    assert_eq!(seen.lock().unwrap()[0].key_type(), KeyType::Cyfral);
    assert!(worker.peripherals().decoder.pulses < 400);
}

// ── Session bracketing ────────────────────────────────────────

#[test]
fn stop_mid_read_powers_down_once() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut key = Key::default();
    let (mut worker, log) = reading_worker(&seen);

    worker.read(&mut key);
    worker.tick();
    worker.stop();
    worker.stop();

    assert_eq!(worker.mode(), WorkerMode::Idle);
    assert_eq!(log.count(HwCall::PowerOn), 1);
    assert_eq!(log.count(HwCall::PowerOff), 1);
    assert!(!worker.peripherals().power.rail.is_enabled());
}

#[test]
fn read_restarted_with_new_key_reports_into_it() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut first = Key::default();
    let mut second = Key::new(KeyType::Metakom);
    let (mut worker, log) = reading_worker(&seen);
    worker.peripherals_mut().host.device = Some(DALLAS_ID);

    worker.read(&mut first);
    worker.read(&mut second);
    assert_eq!(log.count(HwCall::PowerOff), 1);

    worker.tick();
    assert_eq!(worker.key().map(Key::key_type), Some(KeyType::Dallas));
    assert_eq!(log.count(HwCall::PowerOn), 2);
    assert_eq!(log.count(HwCall::PowerOff), 2);
}
