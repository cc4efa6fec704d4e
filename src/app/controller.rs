//! PWM controller — the driver core.
//!
//! [`PwmController`] owns one [`DeviceHandle`] and the transport that reaches
//! it.  Global timing (frequency, sleep, restart) and output-stage settings
//! are device-wide; duty values are per channel and exposed as percentages.
//!
//! ```text
//!  set_channel_percent ──▶ clamp ──▶ invert (SGN0/SGN1) ──▶ round ──▶ LEDn regs
//!  channel_percent     ◀── invert ◀── scale ◀────────────────────────── LEDn regs
//! ```
//!
//! The controller is not internally synchronised.  Every call blocks on the
//! transport and completes or fails as a unit; share it behind one
//! `Mutex` or hand it to a single owning task.

use log::{debug, info};

use crate::channels::{ChannelId, ChannelRef};
use crate::config::PwmConfig;
use crate::drivers::pca9685::{self, MODE2_INVRT, MODE2_OUTDRV, REG_MODE2};
use crate::error::{Error, Result};

use super::ports::{BusTransport, DeviceHandle};

// ───────────────────────────────────────────────────────────────
// PwmController
// ───────────────────────────────────────────────────────────────

pub struct PwmController<T: BusTransport> {
    transport: T,
    handle: DeviceHandle,
}

impl<T: BusTransport> PwmController<T> {
    /// Bring up the device described by `config` and take ownership of it.
    ///
    /// Bring-up claims the address, resets the mode registers (awake,
    /// non-inverted), programs the configured frequency and applies the
    /// configured output stage.  It runs exactly once per controller.
    pub fn new(mut transport: T, config: &PwmConfig) -> Result<Self> {
        config.validate()?;
        if transport.bus_id() != config.bus_id {
            return Err(Error::Config("transport is not on the configured bus"));
        }

        let handle = transport.init(config.address)?;
        let mode2 = if config.open_drain { 0 } else { MODE2_OUTDRV };
        transport.write_register(&handle, REG_MODE2, mode2)?;

        let mut ctl = Self { transport, handle };
        ctl.set_frequency(config.frequency_hz)?;

        info!(
            "pca9685: bus {} addr 0x{:02x} up, {} Hz, open_drain={}",
            handle.bus_id(),
            handle.address(),
            config.frequency_hz,
            config.open_drain
        );
        Ok(ctl)
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the device and return the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    // ── Timing ────────────────────────────────────────────────

    /// Program the frequency shared by all channels.  Range policy is the
    /// transport's; a rejected value comes back as a device error.
    pub fn set_frequency(&mut self, hz: u32) -> Result<()> {
        debug!("pca9685: frequency -> {} Hz", hz);
        self.transport.set_pwm_frequency(&self.handle, hz)?;
        Ok(())
    }

    pub fn frequency(&mut self) -> Result<u32> {
        Ok(self.transport.pwm_frequency(&self.handle)?)
    }

    pub fn restart(&mut self) -> Result<()> {
        debug!("pca9685: restart");
        self.transport.restart(&self.handle)?;
        Ok(())
    }

    pub fn set_sleep(&mut self, enabled: bool) -> Result<()> {
        debug!("pca9685: sleep -> {}", enabled);
        self.transport.set_sleep(&self.handle, enabled)?;
        Ok(())
    }

    pub fn is_sleeping(&mut self) -> Result<bool> {
        Ok(self.transport.is_sleeping(&self.handle)?)
    }

    // ── Output stage ──────────────────────────────────────────

    pub fn set_output_inverted(&mut self, enabled: bool) -> Result<()> {
        let value = if enabled { MODE2_INVRT } else { 0 };
        self.transport
            .update_register(&self.handle, REG_MODE2, MODE2_INVRT, value)?;
        Ok(())
    }

    pub fn is_output_inverted(&mut self) -> Result<bool> {
        Ok(self.transport.read_register(&self.handle, REG_MODE2)? & MODE2_INVRT != 0)
    }

    pub fn set_open_drain(&mut self, enabled: bool) -> Result<()> {
        let value = if enabled { 0 } else { MODE2_OUTDRV };
        self.transport
            .update_register(&self.handle, REG_MODE2, MODE2_OUTDRV, value)?;
        Ok(())
    }

    pub fn is_open_drain(&mut self) -> Result<bool> {
        Ok(self.transport.read_register(&self.handle, REG_MODE2)? & MODE2_OUTDRV == 0)
    }

    // ── Channels ──────────────────────────────────────────────

    /// Set a channel's duty cycle in percent.
    ///
    /// Unknown channels are ignored without touching the bus.  The
    /// percentage is clamped to `[0, 100]`; SGN0/SGN1 store its complement.
    pub fn set_channel_percent<'a>(
        &mut self,
        ch: impl Into<ChannelRef<'a>>,
        pct: f32,
    ) -> Result<()> {
        let ch = ch.into();
        match ch.resolve() {
            Some(id) => self.set_channel(id, pct),
            None => {
                debug!("pca9685: ignoring write to unknown channel {:?}", ch);
                Ok(())
            }
        }
    }

    /// Read a channel's duty cycle in percent; `None` for unknown channels.
    pub fn channel_percent<'a>(
        &mut self,
        ch: impl Into<ChannelRef<'a>>,
    ) -> Result<Option<f32>> {
        match ch.into().resolve() {
            Some(id) => self.channel(id).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_by_name(&mut self, name: &str, pct: f32) -> Result<()> {
        self.set_channel_percent(ChannelRef::Name(name), pct)
    }

    pub fn get_by_name(&mut self, name: &str) -> Result<Option<f32>> {
        self.channel_percent(ChannelRef::Name(name))
    }

    /// Typed variant of [`set_channel_percent`](Self::set_channel_percent).
    pub fn set_channel(&mut self, ch: ChannelId, pct: f32) -> Result<()> {
        let mut effective = pca9685::clamp_percent(pct);
        if ch.is_inverted() {
            effective = 100.0 - effective;
        }
        self.set_duty(ch, pca9685::percent_to_duty(effective))
    }

    /// Typed variant of [`channel_percent`](Self::channel_percent).
    pub fn channel(&mut self, ch: ChannelId) -> Result<f32> {
        let pct = pca9685::duty_to_percent(self.duty(ch)?);
        Ok(if ch.is_inverted() { 100.0 - pct } else { pct })
    }

    /// Write a raw 12-bit duty value (clamped to 4095).
    pub fn set_duty(&mut self, ch: ChannelId, raw: u16) -> Result<()> {
        let raw = raw.min(pca9685::DUTY_MAX);
        debug!("pca9685: {} duty -> {}", ch, raw);
        self.transport.write_block(
            &self.handle,
            pca9685::led_register(ch),
            &pca9685::encode_duty(raw),
        )?;
        Ok(())
    }

    pub fn duty(&mut self, ch: ChannelId) -> Result<u16> {
        let mut regs = [0u8; 4];
        self.transport
            .read_block(&self.handle, pca9685::led_register(ch), &mut regs)?;
        Ok(pca9685::decode_duty(regs))
    }
}
