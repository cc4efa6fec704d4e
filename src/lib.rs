//! PCA9685 PWM controller library.
//!
//! Drives a 16-channel PCA9685 over any register-oriented bus: frequency
//! programming, per-channel duty cycles as percentages, sleep/restart
//! sequencing and output-stage configuration.  Channels are addressed by
//! number or by the board's symbolic names (see [`channels`]).
//!
//! ```text
//!  PwmCommand ──▶ PwmController ──▶ BusTransport ──▶ I2cBus / SimBus
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channels;
pub mod config;
pub mod drivers;
pub mod error;

pub use app::commands::{PwmCommand, Reply};
pub use app::controller::PwmController;
pub use app::ports::{BusTransport, DeviceHandle};
pub use channels::{ChannelId, ChannelRef};
pub use config::PwmConfig;
pub use error::{DeviceError, Error, Result};
