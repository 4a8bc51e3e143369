//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one worker mode (or the
//! service loop) against the simulated board in [`mock_hw`].  All tests
//! run on the host with no real hardware required.

mod read_tests;
mod service_tests;
