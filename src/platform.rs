//! Host integration surface.
//!
//! Everything the core engine needs from the chip it runs on, abstracted
//! behind one trait so the same state machines drive an MSP430, a Cortex-M0,
//! or an AVR without caring which. Modeled after the fallible
//! `InputPin`/`OutputPin` split `embedded-hal` uses, rather than assuming the
//! infallible direct-register access a single-target driver can get away
//! with.

/// Capabilities the core consumes from the host environment.
///
/// The clock and data pins are both open-collector: "high" means released
/// (pulled up externally), "low" means driven. Only the clock pin needs a
/// falling-edge interrupt; the core never asks the platform to interrupt on
/// the data pin.
pub trait Platform {
    /// Error type returned by fallible pin operations.
    type Error: core::fmt::Debug;

    /// Configure the data pin as an input with an internal (or external)
    /// pull-up and release it.
    fn data_set_input_pullup(&mut self) -> Result<(), Self::Error>;
    /// Drive the data pin low.
    fn data_drive_low(&mut self) -> Result<(), Self::Error>;
    /// Sample the data pin's current level.
    fn data_read(&mut self) -> Result<bool, Self::Error>;

    /// Configure the clock pin as an input with an internal (or external)
    /// pull-up and release it.
    fn clock_set_input_pullup(&mut self) -> Result<(), Self::Error>;
    /// Drive the clock pin low.
    fn clock_drive_low(&mut self) -> Result<(), Self::Error>;
    /// Sample the clock pin's current level.
    fn clock_read(&mut self) -> Result<bool, Self::Error>;

    /// Arm the clock pin's falling-edge interrupt. The handler installed by
    /// the platform must call back into the driver's dispatch entry point
    /// (see [`crate::driver`]) and nothing else.
    fn install_clock_falling_edge_interrupt(&mut self);
    /// Disarm the clock pin's falling-edge interrupt.
    fn uninstall_clock_falling_edge_interrupt(&mut self);

    /// Monotonic, wraparound-tolerant microsecond counter.
    fn micros(&self) -> u32;
    /// Monotonic, wraparound-tolerant millisecond counter.
    fn millis(&self) -> u32;
    /// Busy-wait for approximately `us` microseconds. Used only for the
    /// ~100 us inhibit delay and the ~200 us glitch-settling delay, so
    /// accuracy requirements are loose.
    fn busy_wait_micros(&self, us: u32);
}
