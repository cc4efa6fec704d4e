//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the controller against
//! mock transports.  All tests run on the host with no real bus required.

mod command_tests;
mod controller_tests;
