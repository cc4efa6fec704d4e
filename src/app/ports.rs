//! Port traits — the boundary between the controller and the bus.
//!
//! ```text
//!   PwmController ──▶ BusTransport ──▶ I2C adapter / simulator / test fake
//! ```
//!
//! A transport only has to move bytes to and from device registers
//! ([`BusTransport::write_block`], [`BusTransport::read_block`]) and wait
//! ([`BusTransport::delay_us`]).  The PCA9685 sequences built on top of those
//! primitives — bring-up, prescaler programming, restart — are provided
//! methods, so a transport may override any of them (e.g. a device with a
//! firmware helper for restart) without the controller noticing.
//!
//! ## Contract
//!
//! - One call is one bus transaction sequence with one outcome.
//! - Transports own retry and timeout policy; the controller never retries.
//! - Implementations are not required to be `Sync`: callers serialise access.

use crate::drivers::pca9685::{
    self, MODE1_AI, MODE1_ALLCALL, MODE1_RESTART, MODE1_SLEEP, REG_MODE1, REG_PRE_SCALE,
    WAKEUP_DELAY_US,
};
use crate::error::DeviceError;

/// Identifies one physical controller.  Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    bus_id: u8,
    address: u8,
}

impl DeviceHandle {
    /// Build a handle for a 7-bit address on the given bus.
    pub fn new(bus_id: u8, address: u8) -> Result<Self, DeviceError> {
        if address > 0x7F {
            return Err(DeviceError::InvalidAddress(address));
        }
        Ok(Self { bus_id, address })
    }

    pub fn bus_id(&self) -> u8 {
        self.bus_id
    }

    pub fn address(&self) -> u8 {
        self.address
    }
}

// ───────────────────────────────────────────────────────────────
// Bus transport (driven adapter: controller → device registers)
// ───────────────────────────────────────────────────────────────

/// Register-oriented access to a PCA9685-class device.
pub trait BusTransport {
    /// Identifier of the bus this transport drives.
    fn bus_id(&self) -> u8;

    /// Write consecutive registers starting at `reg` (device auto-increment).
    fn write_block(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        data: &[u8],
    ) -> Result<(), DeviceError>;

    /// Read consecutive registers starting at `reg` into `buf`.
    fn read_block(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        buf: &mut [u8],
    ) -> Result<(), DeviceError>;

    /// Block for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);

    // ── Provided: single registers ────────────────────────────

    fn write_register(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        value: u8,
    ) -> Result<(), DeviceError> {
        self.write_block(handle, reg, &[value])
    }

    fn read_register(&mut self, handle: &DeviceHandle, reg: u8) -> Result<u8, DeviceError> {
        let mut buf = [0u8; 1];
        self.read_block(handle, reg, &mut buf)?;
        Ok(buf[0])
    }

    /// Read-modify-write of the bits selected by `mask`.
    fn update_register(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        mask: u8,
        value: u8,
    ) -> Result<(), DeviceError> {
        let current = self.read_register(handle, reg)?;
        self.write_register(handle, reg, (current & !mask) | (value & mask))
    }

    // ── Provided: device sequences ────────────────────────────

    /// Claim the device at `address` and put its mode registers in a known
    /// state: awake, auto-increment on, all-call on.
    fn init(&mut self, address: u8) -> Result<DeviceHandle, DeviceError> {
        let handle = DeviceHandle::new(self.bus_id(), address)?;
        self.write_register(&handle, REG_MODE1, MODE1_AI | MODE1_ALLCALL)?;
        self.delay_us(WAKEUP_DELAY_US);
        Ok(handle)
    }

    /// Set or clear SLEEP; waking waits for the oscillator.
    fn set_sleep(&mut self, handle: &DeviceHandle, sleep: bool) -> Result<(), DeviceError> {
        let value = if sleep { MODE1_SLEEP } else { 0 };
        // RESTART is write-one-to-clear; never echo it back.
        self.update_register(handle, REG_MODE1, MODE1_SLEEP | MODE1_RESTART, value)?;
        if !sleep {
            self.delay_us(WAKEUP_DELAY_US);
        }
        Ok(())
    }

    fn is_sleeping(&mut self, handle: &DeviceHandle) -> Result<bool, DeviceError> {
        Ok(self.read_register(handle, REG_MODE1)? & MODE1_SLEEP != 0)
    }

    /// Program the shared PWM frequency.
    ///
    /// The prescaler only latches while asleep, so the device is put to
    /// sleep for the write and returned to its previous sleep state.
    fn set_pwm_frequency(&mut self, handle: &DeviceHandle, hz: u32) -> Result<(), DeviceError> {
        let prescale = pca9685::prescale_for(hz).ok_or(DeviceError::InvalidFrequency(hz))?;
        let was_sleeping = self.is_sleeping(handle)?;
        self.set_sleep(handle, true)?;
        self.write_register(handle, REG_PRE_SCALE, prescale)?;
        self.set_sleep(handle, was_sleeping)
    }

    fn pwm_frequency(&mut self, handle: &DeviceHandle) -> Result<u32, DeviceError> {
        let prescale = self.read_register(handle, REG_PRE_SCALE)?;
        Ok(pca9685::frequency_for(prescale))
    }

    /// Resume PWM after sleep with the previously programmed duty values.
    fn restart(&mut self, handle: &DeviceHandle) -> Result<(), DeviceError> {
        let mode = self.read_register(handle, REG_MODE1)?;
        if mode & MODE1_RESTART != 0 {
            self.write_register(handle, REG_MODE1, mode & !(MODE1_SLEEP | MODE1_RESTART))?;
            self.delay_us(WAKEUP_DELAY_US);
        }
        self.write_register(handle, REG_MODE1, (mode & !MODE1_SLEEP) | MODE1_RESTART)
    }
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    fn bus_id(&self) -> u8 {
        (**self).bus_id()
    }

    fn write_block(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        data: &[u8],
    ) -> Result<(), DeviceError> {
        (**self).write_block(handle, reg, data)
    }

    fn read_block(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        buf: &mut [u8],
    ) -> Result<(), DeviceError> {
        (**self).read_block(handle, reg, buf)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us);
    }

    fn write_register(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        value: u8,
    ) -> Result<(), DeviceError> {
        (**self).write_register(handle, reg, value)
    }

    fn read_register(&mut self, handle: &DeviceHandle, reg: u8) -> Result<u8, DeviceError> {
        (**self).read_register(handle, reg)
    }

    fn init(&mut self, address: u8) -> Result<DeviceHandle, DeviceError> {
        (**self).init(address)
    }

    fn set_sleep(&mut self, handle: &DeviceHandle, sleep: bool) -> Result<(), DeviceError> {
        (**self).set_sleep(handle, sleep)
    }

    fn is_sleeping(&mut self, handle: &DeviceHandle) -> Result<bool, DeviceError> {
        (**self).is_sleeping(handle)
    }

    fn set_pwm_frequency(&mut self, handle: &DeviceHandle, hz: u32) -> Result<(), DeviceError> {
        (**self).set_pwm_frequency(handle, hz)
    }

    fn pwm_frequency(&mut self, handle: &DeviceHandle) -> Result<u32, DeviceError> {
        (**self).pwm_frequency(handle)
    }

    fn restart(&mut self, handle: &DeviceHandle) -> Result<(), DeviceError> {
        (**self).restart(handle)
    }
}
