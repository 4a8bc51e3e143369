//! Board-level drivers built on `embedded-hal` pins.

pub mod power_rail;
pub mod rfid_lines;
