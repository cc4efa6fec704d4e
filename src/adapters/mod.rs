//! Adapters — concrete implementations of [`BusTransport`](crate::app::ports::BusTransport).
//!
//! | Adapter | Connects to                                   |
//! |---------|-----------------------------------------------|
//! | `i2c`   | any `embedded-hal` 1.0 I2C bus (+ Raspberry Pi opener behind `rpi`) |
//! | `sim`   | in-memory PCA9685 register file               |

pub mod i2c;
pub mod sim;
