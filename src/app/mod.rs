//! Application layer around the worker engine.
//!
//! Collaborators plug in through the **port traits** in [`ports`]; the
//! supervisor talks to the worker thread through [`commands`] and the
//! loop in [`service`].  Nothing here touches hardware directly.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
