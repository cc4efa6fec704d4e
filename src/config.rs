//! Controller configuration parameters
//!
//! Construction-time options for one PCA9685 instance.  Defaults match the
//! bring-up values the board ships with; any of them can be overridden from a
//! JSON file passed to the binary.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Factory-default 7-bit address of a PCA9685 with all address pins low.
pub const DEFAULT_ADDRESS: u8 = 0x40;
/// PWM frequency programmed during bring-up.
pub const DEFAULT_FREQUENCY_HZ: u32 = 500;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwmConfig {
    /// Bus identifier (e.g. `/dev/i2c-N`)
    pub bus_id: u8,
    /// 7-bit device address
    pub address: u8,
    /// PWM frequency applied to all channels at bring-up (Hz)
    pub frequency_hz: u32,
    /// Open-drain output stage at bring-up (false = totem-pole)
    pub open_drain: bool,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            bus_id: 0,
            address: DEFAULT_ADDRESS,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            open_drain: true,
        }
    }
}

impl PwmConfig {
    /// Reject values that can never address a device.
    ///
    /// The frequency is not checked here: range policy belongs to the
    /// transport, which reports it as a device error.
    pub fn validate(&self) -> Result<()> {
        if self.address > 0x7F {
            return Err(Error::Config("address must be a 7-bit value"));
        }
        Ok(())
    }
}
