//! Integration tests for the PwmController → BusTransport contract.
//!
//! These run on the host and assert on the exact bus traffic the
//! controller produces, using the recording [`MockBus`].

use crate::mock_bus::{BusCall, MockBus};

use pcapwm::drivers::pca9685::{self, REG_MODE1, REG_MODE2};
use pcapwm::{ChannelId, DeviceError, Error, PwmConfig, PwmController};

const STEP: f32 = 100.0 / 4095.0;

fn make_ctl(bus: &mut MockBus) -> PwmController<&mut MockBus> {
    PwmController::new(bus, &PwmConfig::default()).unwrap()
}

// ── Bring-up ──────────────────────────────────────────────────

#[test]
fn bring_up_sequence() {
    let mut bus = MockBus::new();
    let ctl = make_ctl(&mut bus);
    assert_eq!(ctl.handle().address(), 0x40);
    drop(ctl);

    assert_eq!(
        bus.calls,
        vec![
            BusCall::Write {
                reg: REG_MODE1,
                data: vec![0x21]
            },
            BusCall::Delay(500),
            BusCall::Write {
                reg: REG_MODE2,
                data: vec![0x00]
            },
            BusCall::SetFrequency(500),
        ]
    );
}

#[test]
fn bring_up_failure_surfaces_device_error() {
    let mut bus = MockBus::new();
    bus.fail_with.set(Some(DeviceError::Nack));
    let err = PwmController::new(&mut bus, &PwmConfig::default()).err();
    assert_eq!(err, Some(Error::Device(DeviceError::Nack)));
}

#[test]
fn bring_up_rejects_eight_bit_address() {
    let mut bus = MockBus::new();
    let cfg = PwmConfig {
        address: 0xC0,
        ..PwmConfig::default()
    };
    assert!(matches!(
        PwmController::new(&mut bus, &cfg),
        Err(Error::Config(_))
    ));
    assert!(bus.calls.is_empty(), "no bus traffic for a bad config");
}

// ── Channel writes ────────────────────────────────────────────

#[test]
fn invalid_channel_write_touches_nothing() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);
    let before = ctl.transport().calls.len();

    ctl.set_channel_percent(16, 50.0).unwrap();
    ctl.set_channel_percent(-1, 50.0).unwrap();
    ctl.set_channel_percent("LED7", 50.0).unwrap();

    assert_eq!(ctl.transport().calls.len(), before);
}

#[test]
fn invalid_channel_read_is_absent() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);
    let before = ctl.transport().calls.len();

    assert_eq!(ctl.channel_percent(20), Ok(None));
    assert_eq!(ctl.transport().calls.len(), before);
}

#[test]
fn encoding_boundaries_reach_the_bus() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);
    let ch = ChannelId::new(0).unwrap();
    let reg = pca9685::led_register(ch);

    ctl.set_channel(ch, 0.0).unwrap();
    assert_eq!(ctl.transport().last_write(), Some((reg, vec![0, 0, 0, 0x10])));
    assert_eq!(ctl.duty(ch), Ok(0));

    ctl.set_channel(ch, 100.0).unwrap();
    assert_eq!(ctl.transport().last_write(), Some((reg, vec![0, 0, 0xFF, 0x0F])));
    assert_eq!(ctl.duty(ch), Ok(4095));
}

#[test]
fn signal_line_end_to_end() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);

    ctl.set_channel_percent(5, 30.0).unwrap();

    // round((100 - 30) * 4095 / 100) = 2867 = 0x0B33
    let sgn1 = ChannelId::new(5).unwrap();
    assert_eq!(
        ctl.transport().last_write(),
        Some((pca9685::led_register(sgn1), vec![0, 0, 0x33, 0x0B]))
    );
    let back = ctl.channel_percent(5).unwrap().unwrap();
    assert!((back - 30.0).abs() <= STEP, "got {back}");
}

#[test]
fn sgn0_is_inverted_too() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);
    let sgn0 = ChannelId::from_name("SGN0").unwrap();

    ctl.set_channel(sgn0, 0.0).unwrap();
    assert_eq!(ctl.duty(sgn0), Ok(4095));
    assert_eq!(ctl.channel(sgn0), Ok(0.0));
}

#[test]
fn neighbours_of_signal_lines_are_not_inverted() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);

    for idx in [4, 7] {
        let ch = ChannelId::new(idx).unwrap();
        ctl.set_channel(ch, 0.0).unwrap();
        assert_eq!(ctl.duty(ch), Ok(0), "channel {idx}");
    }
}

// ── Global settings ───────────────────────────────────────────

#[test]
fn frequency_round_trips_through_faithful_transport() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);

    ctl.set_frequency(1000).unwrap();
    assert_eq!(ctl.frequency(), Ok(1000));
}

#[test]
fn restart_is_delegated_to_transport() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);

    ctl.restart().unwrap();
    assert_eq!(ctl.transport().calls.last(), Some(&BusCall::Restart));
}

#[test]
fn sleep_wake_waits_for_oscillator() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);

    ctl.set_sleep(true).unwrap();
    assert_ne!(ctl.transport().calls.last(), Some(&BusCall::Delay(500)));
    assert!(ctl.is_sleeping().unwrap());

    ctl.set_sleep(false).unwrap();
    assert_eq!(ctl.transport().calls.last(), Some(&BusCall::Delay(500)));
    assert!(!ctl.is_sleeping().unwrap());
}

// ── Failure semantics ─────────────────────────────────────────

#[test]
fn transport_failure_is_reported_once_without_retry() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);
    ctl.transport().fail_with.set(Some(DeviceError::Timeout));
    let before = ctl.transport().calls.len();

    let result = ctl.set_channel_percent(3, 10.0);

    assert_eq!(result, Err(Error::Device(DeviceError::Timeout)));
    assert_eq!(ctl.transport().calls.len(), before + 1, "exactly one attempt");
}

#[test]
fn read_failure_is_not_mistaken_for_absent() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);
    ctl.transport().fail_with.set(Some(DeviceError::Bus));

    assert_eq!(ctl.channel_percent(3), Err(Error::Device(DeviceError::Bus)));
    assert_eq!(ctl.is_open_drain(), Err(Error::Device(DeviceError::Bus)));
    // Unknown channels never reach the failing bus.
    assert_eq!(ctl.channel_percent(99), Ok(None));
}

#[test]
fn rejected_frequency_propagates() {
    let mut bus = MockBus::new();
    let mut ctl = make_ctl(&mut bus);
    ctl.transport()
        .fail_with
        .set(Some(DeviceError::InvalidFrequency(100_000)));

    assert_eq!(
        ctl.set_frequency(100_000),
        Err(Error::Device(DeviceError::InvalidFrequency(100_000)))
    );
}
