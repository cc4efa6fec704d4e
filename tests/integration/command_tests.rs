//! Integration tests for the text command surface.
//!
//! Drives whole command lines through `PwmCommand::parse` and
//! `PwmController::execute` against the simulated device, the same path
//! the binary uses.

use std::sync::{Arc, Mutex};
use std::thread;

use pcapwm::adapters::sim::SimBus;
use pcapwm::app::commands::ParseError;
use pcapwm::{DeviceError, Error, PwmCommand, PwmConfig, PwmController, Reply};

fn make_ctl() -> PwmController<SimBus> {
    PwmController::new(SimBus::new(0), &PwmConfig::default()).unwrap()
}

fn run(ctl: &mut PwmController<SimBus>, line: &str) -> Reply {
    let cmd = PwmCommand::parse(line).unwrap();
    ctl.execute(&cmd).unwrap()
}

fn percent(reply: Reply) -> f32 {
    match reply {
        Reply::Percent(Some(p)) => p,
        other => panic!("expected a percentage, got {other:?}"),
    }
}

#[test]
fn script_session() {
    let mut ctl = make_ctl();

    assert_eq!(run(&mut ctl, "get_freq"), Reply::Frequency(508));
    assert_eq!(run(&mut ctl, "is_open_drn"), Reply::Flag(true));
    assert_eq!(run(&mut ctl, "SGN1 = 30"), Reply::Done);
    assert!((percent(run(&mut ctl, "SGN1")) - 30.0).abs() < 0.03);
    assert!((percent(run(&mut ctl, "ch_val 5")) - 30.0).abs() < 0.03);
    assert_eq!(run(&mut ctl, "ch_val 12 55"), Reply::Done);
    assert!((percent(run(&mut ctl, "LED3")) - 55.0).abs() < 0.03);
}

#[test]
fn unknown_channels_are_nil_not_errors() {
    let mut ctl = make_ctl();
    assert_eq!(run(&mut ctl, "LED9"), Reply::Percent(None));
    assert_eq!(run(&mut ctl, "ch_val 20"), Reply::Percent(None));
    assert_eq!(run(&mut ctl, "LED9 = 40"), Reply::Done);
    assert_eq!(run(&mut ctl, "-1 = 40"), Reply::Done);
    assert_eq!(run(&mut ctl, "LED9").to_string(), "nil");
}

#[test]
fn global_toggles() {
    let mut ctl = make_ctl();

    run(&mut ctl, "sleep 1");
    assert_eq!(run(&mut ctl, "is_sleep"), Reply::Flag(true));
    run(&mut ctl, "restart");
    assert_eq!(run(&mut ctl, "is_sleep"), Reply::Flag(false));

    run(&mut ctl, "invert 1");
    assert_eq!(run(&mut ctl, "is_invert"), Reply::Flag(true));
    run(&mut ctl, "open_drn 0");
    assert_eq!(run(&mut ctl, "is_open_drn"), Reply::Flag(false));
}

#[test]
fn set_freq_quantises_to_prescaler() {
    let mut ctl = make_ctl();
    assert_eq!(run(&mut ctl, "set_freq 1000"), Reply::Done);
    assert_eq!(run(&mut ctl, "get_freq"), Reply::Frequency(1017));
}

#[test]
fn out_of_range_frequency_is_a_device_error() {
    let mut ctl = make_ctl();
    let cmd = PwmCommand::parse("set_freq 2000").unwrap();
    assert_eq!(
        ctl.execute(&cmd),
        Err(Error::Device(DeviceError::InvalidFrequency(2000)))
    );
    // The device keeps its previous frequency.
    assert_eq!(run(&mut ctl, "get_freq"), Reply::Frequency(508));
}

#[test]
fn parse_errors_never_reach_the_device() {
    let ctl = make_ctl();
    let before = ctl.transport().clone();

    assert_eq!(PwmCommand::parse("set_freq"), Err(ParseError::MissingArgument));
    assert_eq!(PwmCommand::parse("ch_val 5 abc"), Err(ParseError::BadNumber));

    for reg in 0..=255u8 {
        assert_eq!(ctl.transport().register(reg), before.register(reg));
    }
}

#[test]
fn shared_controller_behind_one_lock() {
    let ctl = Arc::new(Mutex::new(make_ctl()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ctl = Arc::clone(&ctl);
            thread::spawn(move || {
                let line = format!("ch_val {} {}", 10 + i, 20 * i);
                let cmd = PwmCommand::parse(&line).unwrap();
                ctl.lock().unwrap().execute(&cmd).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut ctl = ctl.lock().unwrap();
    for i in 0..4 {
        let pct = ctl.channel_percent(10 + i).unwrap().unwrap();
        assert!((pct - 20.0 * i as f32).abs() < 0.03, "channel {}", 10 + i);
    }
}
