//! `std`-backed test double for [`crate::platform::Platform`].
//!
//! Exists purely so the receiver/transmitter/sequencer state machines can be
//! driven deterministically by `#[test]`s without real hardware, per
//! SPEC_FULL's test-tooling section.

extern crate std;

use crate::platform::Platform;
use core::cell::Cell;
use core::convert::Infallible;

/// A fully in-memory stand-in for a clock/data pin pair. `millis`/`micros`
/// auto-advance by a small fixed step every time they're read, so a
/// timeout-bounded wait loop under test always terminates instead of
/// spinning forever against a clock that never moves.
pub struct MockPlatform {
    data_level: Cell<bool>,
    clock_level: Cell<bool>,
    micros: Cell<u32>,
    millis: Cell<u32>,
    micros_per_read: u32,
    interrupt_installed: Cell<bool>,
}

impl MockPlatform {
    pub fn new() -> Self {
        MockPlatform {
            data_level: Cell::new(true),
            clock_level: Cell::new(true),
            micros: Cell::new(0),
            millis: Cell::new(0),
            micros_per_read: 50,
            interrupt_installed: Cell::new(false),
        }
    }

    pub fn data_level(&self) -> bool {
        self.data_level.get()
    }

    pub fn clock_level(&self) -> bool {
        self.clock_level.get()
    }

    pub fn set_data_level(&mut self, level: bool) {
        self.data_level.set(level);
    }

    pub fn set_clock_level(&mut self, level: bool) {
        self.clock_level.set(level);
    }

    pub fn interrupt_installed(&self) -> bool {
        self.interrupt_installed.get()
    }

    /// Advance the simulated clock without reading it.
    pub fn advance_millis(&self, ms: u32) {
        self.millis.set(self.millis.get().wrapping_add(ms));
        self.micros.set(self.micros.get().wrapping_add(ms * 1000));
    }

    pub fn set_millis(&self, ms: u32) {
        self.millis.set(ms);
    }

    pub fn set_micros(&self, us: u32) {
        self.micros.set(us);
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MockPlatform {
    type Error = Infallible;

    fn data_set_input_pullup(&mut self) -> Result<(), Self::Error> {
        self.data_level.set(true);
        Ok(())
    }

    fn data_drive_low(&mut self) -> Result<(), Self::Error> {
        self.data_level.set(false);
        Ok(())
    }

    fn data_read(&mut self) -> Result<bool, Self::Error> {
        Ok(self.data_level.get())
    }

    fn clock_set_input_pullup(&mut self) -> Result<(), Self::Error> {
        self.clock_level.set(true);
        Ok(())
    }

    fn clock_drive_low(&mut self) -> Result<(), Self::Error> {
        self.clock_level.set(false);
        Ok(())
    }

    fn clock_read(&mut self) -> Result<bool, Self::Error> {
        Ok(self.clock_level.get())
    }

    fn install_clock_falling_edge_interrupt(&mut self) {
        self.interrupt_installed.set(true);
    }

    fn uninstall_clock_falling_edge_interrupt(&mut self) {
        self.interrupt_installed.set(false);
    }

    fn micros(&self) -> u32 {
        let v = self.micros.get();
        self.micros.set(v.wrapping_add(self.micros_per_read));
        v
    }

    fn millis(&self) -> u32 {
        let v = self.millis.get();
        self.millis.set(v.wrapping_add(1));
        v
    }

    fn busy_wait_micros(&self, us: u32) {
        self.advance_millis(us / 1000 + 1);
    }
}
