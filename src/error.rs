//! Unified error types for the PWM controller.
//!
//! A single `Error` enum that every layer converts into, so the binary and
//! any embedding application handle failures uniformly.  All variants are
//! `Copy` so they can be passed around without allocation.
//!
//! Invalid channel numbers are deliberately absent: they resolve to a no-op
//! write or an absent read and never reach this type.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The bus transport or the device itself failed.
    Device(DeviceError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "device: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Device / transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// No acknowledgment received (device absent or wrong address).
    Nack,
    /// Bus error, arbitration loss or overrun.
    Bus,
    /// The transaction did not complete in time.
    Timeout,
    /// Address is not a valid 7-bit bus address.
    InvalidAddress(u8),
    /// Frequency cannot be expressed with the device prescaler.
    InvalidFrequency(u32),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge from device"),
            Self::Bus => write!(f, "bus error"),
            Self::Timeout => write!(f, "bus timeout"),
            Self::InvalidAddress(addr) => write!(f, "invalid device address 0x{addr:02x}"),
            Self::InvalidFrequency(hz) => write!(f, "frequency {hz} Hz out of range"),
        }
    }
}

impl core::error::Error for DeviceError {}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
