//! Application core — the controller and the surfaces around it.
//!
//! All device access goes through the [`ports::BusTransport`] trait, keeping
//! this layer testable without a real bus.  [`commands`] is the text command
//! surface layered on top of [`controller::PwmController`].

pub mod commands;
pub mod controller;
pub mod ports;
