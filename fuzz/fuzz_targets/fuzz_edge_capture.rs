//! Fuzz target: `EdgeCapture` interrupt-to-task ring
//!
//! Interprets the input as a script of `arm` / `on_edge` / `pop` / `drain`
//! operations and checks the ring against a plain `VecDeque` model:
//! - No panics under any byte sequence
//! - Pending edges never exceed `EDGE_QUEUE_CAP - 1`
//! - Edges come out in FIFO order with wrapping durations
//! - Every edge that did not fit is counted as an overrun
//!
//! cargo fuzz run fuzz_edge_capture

#![no_main]

use std::collections::VecDeque;

use ibutton_worker::pulse::capture::{EDGE_QUEUE_CAP, EdgeCapture, EdgeEvent};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let capture = EdgeCapture::new();
    let mut model: VecDeque<EdgeEvent> = VecDeque::new();
    let mut overruns = 0u32;
    let mut last = 0u32;

    for chunk in data.chunks(5) {
        let op = chunk[0] % 4;
        let arg = chunk
            .get(1..5)
            .and_then(|b| b.try_into().ok())
            .map_or(0, u32::from_le_bytes);

        match op {
            0 => {
                capture.arm(arg);
                model.clear();
                overruns = 0;
                last = arg;
            }
            1 => {
                let level = chunk[0] & 0x80 != 0;
                let now = last.wrapping_add(arg);
                capture.on_edge(level, now);
                let duration = now.wrapping_sub(last);
                last = now;
                if model.len() < EDGE_QUEUE_CAP - 1 {
                    model.push_back(EdgeEvent {
                        level,
                        // Durations past 31 bits saturate.
                        duration: duration.min(0x7FFF_FFFF),
                    });
                } else {
                    overruns += 1;
                }
            }
            2 => {
                let got = capture.pop();
                assert_eq!(got, model.pop_front());
            }
            _ => {
                let mut got = Vec::new();
                capture.drain(|e| got.push(e));
                let expected: Vec<EdgeEvent> = model.drain(..).collect();
                assert_eq!(got, expected);
            }
        }

        assert_eq!(capture.len(), model.len());
        assert!(capture.len() < EDGE_QUEUE_CAP);
        assert_eq!(capture.last_edge(), last);
    }

    assert_eq!(capture.take_overruns(), overruns);
});
