//! Crate-level error type.
//!
//! Nothing in the protocol engine itself raises: framing errors are
//! recovered in the ISR, command failures come back as `bool`, and buffer
//! overflow is absorbed and only surfaced through [`crate::diagnostics`].
//! [`Ps2Error`] exists only for the handful of failures that precede any of
//! that machinery running at all.

use core::fmt::Debug;
use thiserror::Error;

/// Failures that can occur outside the steady-state protocol.
#[derive(Debug, Error)]
pub enum Ps2Error<E: Debug> {
    /// A driver for this clock-pin identity already exists in the global
    /// dispatch table (see the module-level docs on [`crate::driver`]).
    #[error("a driver is already installed on this clock pin")]
    PinAlreadyClaimed,
    /// The platform rejected a pin operation (configuring a pin, driving it
    /// low, or sampling it).
    #[error("platform pin operation failed: {0:?}")]
    Platform(#[from] E),
}
