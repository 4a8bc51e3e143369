//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter | Implements | Connects to                          |
//! |---------|------------|--------------------------------------|
//! | `time`  | Clock      | ESP-IDF high-res timer + FreeRTOS    |
//! |         |            | (host: `Instant` + thread sleep)     |

pub mod time;
