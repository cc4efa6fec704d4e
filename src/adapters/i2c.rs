//! Hardware transport over an `embedded-hal` I2C bus.
//!
//! Wraps any [`embedded_hal::i2c::I2c`] implementation together with a
//! [`DelayNs`] provider.  Block writes go out as one transaction
//! (register pointer followed by the payload); reads use a repeated-start
//! `write_read`.  No retries happen here: a failed transaction is reported
//! once, mapped onto [`DeviceError`].

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, I2c};
use heapless::Vec;
use log::warn;

use crate::app::ports::{BusTransport, DeviceHandle};
use crate::error::DeviceError;

/// Register pointer plus one full LED block.
const MAX_WRITE: usize = 5;

pub struct I2cBus<I2C, D> {
    bus_id: u8,
    i2c: I2C,
    delay: D,
}

impl<I2C, D> I2cBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(bus_id: u8, i2c: I2C, delay: D) -> Self {
        Self { bus_id, i2c, delay }
    }

    /// Give back the underlying bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

fn map_error<E: embedded_hal::i2c::Error>(e: &E) -> DeviceError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => DeviceError::Nack,
        ErrorKind::Bus | ErrorKind::ArbitrationLoss | ErrorKind::Overrun => DeviceError::Bus,
        other => {
            warn!("i2c: unclassified bus error {:?}", other);
            DeviceError::Bus
        }
    }
}

impl<I2C, D> BusTransport for I2cBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn bus_id(&self) -> u8 {
        self.bus_id
    }

    fn write_block(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        data: &[u8],
    ) -> Result<(), DeviceError> {
        let mut frame: Vec<u8, MAX_WRITE> = Vec::new();
        frame.push(reg).map_err(|_| DeviceError::Bus)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| DeviceError::Bus)?;
        self.i2c
            .write(handle.address(), &frame)
            .map_err(|e| map_error(&e))
    }

    fn read_block(
        &mut self,
        handle: &DeviceHandle,
        reg: u8,
        buf: &mut [u8],
    ) -> Result<(), DeviceError> {
        self.i2c
            .write_read(handle.address(), &[reg], buf)
            .map_err(|e| map_error(&e))
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

/// Open `/dev/i2c-<bus_id>` on a Raspberry Pi.
#[cfg(feature = "rpi")]
pub fn open_rpi(bus_id: u8) -> anyhow::Result<I2cBus<rppal::i2c::I2c, rppal::hal::Delay>> {
    let i2c = rppal::i2c::I2c::with_bus(bus_id)?;
    Ok(I2cBus::new(bus_id, i2c, rppal::hal::Delay::new()))
}
