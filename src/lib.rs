//! iButton worker library.
//!
//! Runs the read / write / emulate mode engine for contact keys: Dallas
//! 1-Wire ROM keys plus the comparator-decoded Cyfral and Metakom
//! protocols.  The engine owns its peripherals through the port traits in
//! [`app::ports`] and is driven either tick by tick ([`worker::Worker`])
//! or from a mailbox loop ([`app::service::WorkerService`]).
//!
//! ESP-IDF specific code is guarded by the `espidf` feature inside each
//! module; everything else builds and tests on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod key;
pub mod onewire;
pub mod pulse;
pub mod worker;

pub mod adapters;
pub mod drivers;

pub use app::commands::{WorkerMailbox, WorkerMessage};
pub use app::events::{WriteResult, WriterOutcome};
pub use app::service::WorkerService;
pub use config::WorkerConfig;
pub use error::{Error, Result};
pub use key::{Key, KeyType};
pub use worker::{Quantum, Worker, WorkerMode};
