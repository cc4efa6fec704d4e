//! Simulated PCA9685 — an in-memory register file behind [`BusTransport`].
//!
//! Used by the binary when no hardware bus is compiled in, and by tests.
//! Emulates the register behaviour the driver depends on:
//!
//! - power-on values (asleep, totem-pole, all channels full-off, 200 Hz)
//! - PRE_SCALE only latches while SLEEP is set
//! - RESTART is set on entering sleep and cleared by writing a 1
//! - block access auto-increments only when MODE1.AI is set
//!
//! Delays are accumulated instead of slept.

use crate::app::ports::{BusTransport, DeviceHandle};
use crate::channels::CHANNEL_COUNT;
use crate::config::DEFAULT_ADDRESS;
use crate::drivers::pca9685::{
    LED_FULL_ON_OFF, MODE1_AI, MODE1_ALLCALL, MODE1_RESTART, MODE1_SLEEP, MODE2_OUTDRV,
    OFFS_OFF_H, REG_LED0, REG_MODE1, REG_MODE2, REG_PRE_SCALE,
};
use crate::error::DeviceError;

#[derive(Debug, Clone)]
pub struct SimBus {
    bus_id: u8,
    address: u8,
    regs: [u8; 256],
    elapsed_us: u64,
}

impl SimBus {
    /// A freshly powered device at the default address.
    pub fn new(bus_id: u8) -> Self {
        Self::with_address(bus_id, DEFAULT_ADDRESS)
    }

    pub fn with_address(bus_id: u8, address: u8) -> Self {
        let mut regs = [0u8; 256];
        regs[REG_MODE1 as usize] = MODE1_SLEEP | MODE1_ALLCALL;
        regs[REG_MODE2 as usize] = MODE2_OUTDRV;
        regs[REG_PRE_SCALE as usize] = 0x1E;
        for ch in 0..CHANNEL_COUNT {
            regs[REG_LED0 as usize + 4 * ch + OFFS_OFF_H] = LED_FULL_ON_OFF;
        }
        Self {
            bus_id,
            address,
            regs,
            elapsed_us: 0,
        }
    }

    /// Current value of a register.
    pub fn register(&self, reg: u8) -> u8 {
        self.regs[reg as usize]
    }

    /// Total time spent in [`BusTransport::delay_us`].
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    fn check(&self, handle: &DeviceHandle) -> Result<(), DeviceError> {
        if handle.bus_id() != self.bus_id || handle.address() != self.address {
            return Err(DeviceError::Nack);
        }
        Ok(())
    }

    fn store(&mut self, reg: u8, value: u8) {
        match reg {
            REG_MODE1 => {
                let old = self.regs[REG_MODE1 as usize];
                let mut restart = if value & MODE1_RESTART != 0 {
                    false
                } else {
                    old & MODE1_RESTART != 0
                };
                if old & MODE1_SLEEP == 0 && value & MODE1_SLEEP != 0 {
                    restart = true;
                }
                let restart_bit = if restart { MODE1_RESTART } else { 0 };
                self.regs[REG_MODE1 as usize] = (value & !MODE1_RESTART) | restart_bit;
            }
            REG_PRE_SCALE => {
                if self.regs[REG_MODE1 as usize] & MODE1_SLEEP != 0 {
                    self.regs[REG_PRE_SCALE as usize] = value;
                }
            }
            _ => self.regs[reg as usize] = value,
        }
    }

    fn step(&self) -> u8 {
        u8::from(self.regs[REG_MODE1 as usize] & MODE1_AI != 0)
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BusTransport for SimBus {
    fn bus_id(&self) -> u8 {
        self.bus_id
    }

    fn write_block(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        data: &[u8],
    ) -> Result<(), DeviceError> {
        self.check(handle)?;
        let step = self.step();
        let mut at = reg;
        for &byte in data {
            self.store(at, byte);
            at = at.wrapping_add(step);
        }
        Ok(())
    }

    fn read_block(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        buf: &mut [u8],
    ) -> Result<(), DeviceError> {
        self.check(handle)?;
        let step = self.step();
        let mut at = reg;
        for slot in buf.iter_mut() {
            *slot = self.regs[at as usize];
            at = at.wrapping_add(step);
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }
}
