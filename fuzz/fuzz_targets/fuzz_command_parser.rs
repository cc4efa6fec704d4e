//! Fuzz target: `PwmCommand::parse` + `PwmController::execute`
//!
//! Feeds arbitrary text lines through the command parser and runs every
//! line that parses against the simulated device.  Asserts that nothing
//! panics, that channel reads stay within 0–100 % and that the simulator
//! never reports a bus fault.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use pcapwm::adapters::sim::SimBus;
use pcapwm::{DeviceError, Error, PwmCommand, PwmConfig, PwmController, Reply};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(mut ctl) = PwmController::new(SimBus::new(0), &PwmConfig::default()) else {
        panic!("simulator bring-up must succeed");
    };

    for line in text.lines() {
        let Ok(cmd) = PwmCommand::parse(line) else {
            continue;
        };
        match ctl.execute(&cmd) {
            Ok(Reply::Percent(Some(pct))) => {
                assert!((0.0..=100.0).contains(&pct), "percent out of range: {pct}");
            }
            Ok(_) => {}
            // Only frequency range rejections are legitimate here.
            Err(Error::Device(DeviceError::InvalidFrequency(_))) => {}
            Err(e) => panic!("unexpected error from simulator: {e}"),
        }
    }
});
