//! Interrupt-driven host-side driver for the PS/2 keyboard wire protocol.
//!
//! The crate is organised leaf-first, matching how data actually flows: a
//! falling clock edge drives [`receiver`] or [`transmitter`], bytes cross
//! from there into [`buffer`], [`switcher`] turns the receiver into an
//! armed transmitter and back, [`sequencer`] drives the whole thing from
//! the foreground, and [`driver`] is what an application actually
//! constructs and polls.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod buffer;
pub mod commands;
pub mod config;
pub mod diagnostics;
mod driver;
pub mod error;
pub mod platform;
mod receiver;
pub mod scancode;
mod sequencer;
mod switcher;
mod time;
mod transmitter;

#[cfg(test)]
mod test_support;

pub use buffer::OutputBuffer;
pub use commands::{command, reply};
pub use config::Ps2Config;
pub use diagnostics::{DiagnosticEvent, Diagnostics, EventRecorder, NoopDiagnostics};
#[cfg(feature = "log")]
pub use diagnostics::LogDiagnostics;
#[cfg(feature = "defmt")]
pub use diagnostics::DefmtDiagnostics;
pub use driver::Ps2Keyboard;
pub use error::Ps2Error;
pub use platform::Platform;
pub use scancode::ScanCode;
