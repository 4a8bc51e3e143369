//! Service loop: requests arrive through the mailbox while the worker
//! runs on its own thread.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use ibutton_worker::app::commands::{WorkerMailbox, WorkerMessage};
use ibutton_worker::app::events::WriterOutcome;
use ibutton_worker::app::service::WorkerService;
use ibutton_worker::key::{Key, KeyType};
use ibutton_worker::worker::{Worker, WorkerMode};

use crate::mock_hw::{DALLAS_ID, HwCall, sim_board};

#[test]
fn read_request_served_on_worker_thread() {
    let mut key = Key::default();
    let mailbox = WorkerMailbox::new();
    let (found_tx, found_rx) = mpsc::channel();

    let (hw, log) = sim_board();
    let mut worker = Worker::new(hw);
    worker.peripherals_mut().host.device = Some(DALLAS_ID);
    worker.set_read_callback(move |key| {
        let _ = found_tx.send(*key);
    });

    let worker = thread::scope(|s| {
        let handle = s.spawn(|| {
            let mut service = WorkerService::new(worker, &mailbox);
            service.run();
            service.into_worker()
        });

        assert!(mailbox.read(&mut key).is_ok());
        let found = found_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("read callback never fired");
        assert_eq!(found.key_type(), KeyType::Dallas);
        assert_eq!(found.data(), &DALLAS_ID);

        assert!(mailbox.end().is_ok());
        handle.join().expect("worker thread panicked")
    });

    assert_eq!(worker.mode(), WorkerMode::Idle);
    assert_eq!(log.count(HwCall::PowerOn), 1);
    assert_eq!(log.count(HwCall::PowerOff), 1);
}

#[test]
fn end_while_writing_returns_to_idle() {
    let mut key = Key::default();
    let mailbox = WorkerMailbox::new();
    let (hw, log) = sim_board();
    let worker = Worker::new(hw);

    assert!(mailbox.write(&mut key).is_ok());
    assert!(mailbox.end().is_ok());

    let mut service = WorkerService::new(worker, &mailbox);
    service.run();

    assert_eq!(service.handled(), 2);
    assert_eq!(service.worker().mode(), WorkerMode::Idle);
    // End arrived before the first quantum ran out: no attempt was made.
    assert_eq!(log.count(HwCall::WriterWrite), 0);
    assert_eq!(
        log.snapshot(),
        vec![
            HwCall::PowerOn,
            HwCall::HostStart,
            HwCall::HostStop,
            HwCall::PowerOff,
        ]
    );
}

#[test]
fn quiet_mailbox_lets_the_mode_tick() {
    let mut key = Key::default();
    let mailbox = WorkerMailbox::new();
    let (write_tx, write_rx) = mpsc::channel();
    let (hw, log) = sim_board();
    let mut worker = Worker::new(hw);
    worker.peripherals_mut().writer.fallback = WriterOutcome::SameKey;
    worker.set_write_callback(move |r| {
        let _ = write_tx.send(r);
    });

    thread::scope(|s| {
        let handle = s.spawn(|| {
            let mut service = WorkerService::new(worker, &mailbox);
            service.run();
        });

        assert!(mailbox.write(&mut key).is_ok());
        for _ in 0..3 {
            assert!(write_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        }
        assert!(mailbox.end().is_ok());
        handle.join().expect("worker thread panicked");
    });

    assert!(log.count(HwCall::WriterWrite) >= 3);
    assert_eq!(log.count(HwCall::PowerOff), 1);
}

#[test]
fn stop_then_emulate_sequence() {
    let mut dallas = Key::with_data(KeyType::Dallas, &DALLAS_ID).unwrap();
    let mailbox = WorkerMailbox::new();
    let (hw, log) = sim_board();
    let mut service = WorkerService::new(Worker::new(hw), &mailbox);

    assert!(service.handle_message(WorkerMessage::Emulate(&mut dallas)).is_continue());
    assert_eq!(service.worker().mode(), WorkerMode::Emulate);
    assert!(service.handle_message(WorkerMessage::Stop).is_continue());
    assert_eq!(service.worker().mode(), WorkerMode::Idle);
    assert!(service.handle_message(WorkerMessage::End).is_break());

    assert_eq!(log.count(HwCall::SlaveStart), 1);
    assert_eq!(log.count(HwCall::SlaveStop), 1);
    assert_eq!(service.handled(), 3);
}
