//! NXP PCA9685 register map and value encoding.
//!
//! Pure functions and constants only.  The bus helpers in
//! [`BusTransport`](crate::app::ports::BusTransport) and the simulator in
//! [`adapters::sim`](crate::adapters::sim) are both built on this module, so
//! the datasheet arithmetic lives in exactly one place.

use crate::channels::ChannelId;

// ── Registers ─────────────────────────────────────────────────

pub const REG_MODE1: u8 = 0x00;
pub const REG_MODE2: u8 = 0x01;
/// LED0_ON_L; every channel owns four consecutive registers.
pub const REG_LED0: u8 = 0x06;
pub const REG_PRE_SCALE: u8 = 0xFE;

/// Offsets inside a channel's register block.
pub const OFFS_ON_H: usize = 1;
pub const OFFS_OFF_H: usize = 3;

// ── MODE1 / MODE2 bits ────────────────────────────────────────

pub const MODE1_RESTART: u8 = 0x80;
pub const MODE1_AI: u8 = 0x20;
pub const MODE1_SLEEP: u8 = 0x10;
pub const MODE1_ALLCALL: u8 = 0x01;

pub const MODE2_INVRT: u8 = 0x10;
/// Totem-pole output stage when set, open-drain when clear.
pub const MODE2_OUTDRV: u8 = 0x04;

/// Full-on / full-off flag in the ON_H / OFF_H registers.
pub const LED_FULL_ON_OFF: u8 = 0x10;

// ── Timing ────────────────────────────────────────────────────

/// Internal oscillator frequency.
pub const INTERNAL_FREQ_HZ: u32 = 25_000_000;
pub const MIN_PRESCALE: u8 = 0x03;
pub const MAX_PRESCALE: u8 = 0xFF;
/// Oscillator stabilisation time after clearing SLEEP.
pub const WAKEUP_DELAY_US: u32 = 500;

// ── Duty encoding ─────────────────────────────────────────────

/// Largest duty value written to a channel.
pub const DUTY_MAX: u16 = 4095;

/// First register of a channel's ON_L/ON_H/OFF_L/OFF_H block.
pub fn led_register(ch: ChannelId) -> u8 {
    REG_LED0 + 4 * ch.index()
}

/// Clamp a percentage into `[0, 100]`.  NaN is treated as 0.
pub fn clamp_percent(pct: f32) -> f32 {
    if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) }
}

/// `round(pct * 4095 / 100)` after clamping.
pub fn percent_to_duty(pct: f32) -> u16 {
    let pct = f64::from(clamp_percent(pct));
    let raw = (pct * f64::from(DUTY_MAX) / 100.0).round();
    (raw as u16).min(DUTY_MAX)
}

/// `raw * 100 / 4095`; raw values above 4095 saturate.
pub fn duty_to_percent(raw: u16) -> f32 {
    (f64::from(raw.min(DUTY_MAX)) * 100.0 / f64::from(DUTY_MAX)) as f32
}

/// Register payload (ON_L, ON_H, OFF_L, OFF_H) for a duty value.
///
/// Zero uses the full-off flag so the output is guaranteed low; anything
/// else starts the pulse at tick 0 and ends it at `raw`.
pub fn encode_duty(raw: u16) -> [u8; 4] {
    let raw = raw.min(DUTY_MAX);
    if raw == 0 {
        [0, 0, 0, LED_FULL_ON_OFF]
    } else {
        [0, 0, (raw & 0xFF) as u8, (raw >> 8) as u8]
    }
}

/// Inverse of [`encode_duty`], also accepting the full-on flag.
pub fn decode_duty(regs: [u8; 4]) -> u16 {
    if regs[OFFS_OFF_H] & LED_FULL_ON_OFF != 0 {
        return 0;
    }
    if regs[OFFS_ON_H] & LED_FULL_ON_OFF != 0 {
        return DUTY_MAX;
    }
    u16::from(regs[2]) | (u16::from(regs[OFFS_OFF_H] & 0x0F) << 8)
}

// ── Frequency encoding ────────────────────────────────────────

/// `round(25 MHz / (4096 * hz)) - 1`, or `None` if outside the prescaler range.
pub fn prescale_for(hz: u32) -> Option<u8> {
    if hz == 0 {
        return None;
    }
    let div = 4096 * u64::from(hz);
    let rounded = (u64::from(INTERNAL_FREQ_HZ) + div / 2) / div;
    let prescale = rounded.checked_sub(1)?;
    u8::try_from(prescale)
        .ok()
        .filter(|p| (MIN_PRESCALE..=MAX_PRESCALE).contains(p))
}

/// Output frequency produced by a prescaler value.
pub fn frequency_for(prescale: u8) -> u32 {
    INTERNAL_FREQ_HZ / (4096 * (u32::from(prescale) + 1))
}
