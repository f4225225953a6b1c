//! Per-edge frame transmitter state machine (spec §4.4).
//!
//! Owned by the interrupt context once armed by the direction switcher. The
//! data line is open-collector: driving bit `1` means releasing it (the
//! external pull-up takes it high), driving bit `0` means pulling it low.

use crate::diagnostics::Diagnostics;
use crate::platform::Platform;

/// What happened on the edge just handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitOutcome {
    /// More edges expected before the byte is fully sent.
    Continue,
    /// The twelfth edge (the ack pulse) has been sampled; the frame is over
    /// and the receiver should be re-armed regardless of `device_acked`.
    Done { device_acked: bool },
}

/// Assembles and drives one 12-bit frame (start/8 data/parity/stop/ack).
pub struct Transmitter {
    bit_count: u8,
    byte: u8,
    running_parity_odd: bool,
}

impl Transmitter {
    pub const fn new() -> Self {
        Transmitter {
            bit_count: 0,
            byte: 0,
            running_parity_odd: false,
        }
    }

    /// Loads the byte to send and resets the bit counter and parity. Called
    /// by the direction switcher before arming the interrupt (spec 4.5 step
    /// 3); the start bit itself is driven by the switcher, not here.
    pub fn load(&mut self, byte: u8) {
        self.bit_count = 0;
        self.byte = byte;
        self.running_parity_odd = false;
    }

    /// Handles one falling clock edge.
    pub fn on_falling_edge<P: Platform>(
        &mut self,
        platform: &mut P,
        diagnostics: &mut impl Diagnostics,
    ) -> Result<TransmitOutcome, P::Error> {
        match self.bit_count {
            0 => {
                // The device is sampling the start bit the switcher already
                // drove low; nothing to output on this edge.
                self.bit_count = 1;
            }
            1..=8 => {
                let k = self.bit_count - 1;
                let bit = (self.byte >> k) & 1 == 1;
                if bit {
                    self.running_parity_odd = !self.running_parity_odd;
                    platform.data_set_input_pullup()?;
                } else {
                    platform.data_drive_low()?;
                }
                self.bit_count += 1;
            }
            9 => {
                let parity_bit = !self.running_parity_odd;
                if parity_bit {
                    platform.data_set_input_pullup()?;
                } else {
                    platform.data_drive_low()?;
                }
                self.bit_count = 10;
            }
            10 => {
                // Release data; the line floats high for the stop bit.
                platform.data_set_input_pullup()?;
                self.bit_count = 11;
            }
            11 => {
                let device_acked = !platform.data_read()?;
                if !device_acked {
                    diagnostics.send_frame_error();
                }
                self.bit_count = 0;
                return Ok(TransmitOutcome::Done { device_acked });
            }
            _ => unreachable!("bit counter must stay within 0..=11"),
        }
        Ok(TransmitOutcome::Continue)
    }
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoopDiagnostics;
    use crate::test_support::MockPlatform;

    #[test]
    fn sends_frame_and_reads_ack() {
        let mut platform = MockPlatform::new();
        let mut diag = NoopDiagnostics;
        let mut tx = Transmitter::new();
        tx.load(0xED);

        // Counter 0: nothing driven.
        assert_eq!(
            tx.on_falling_edge(&mut platform, &mut diag).unwrap(),
            TransmitOutcome::Continue
        );

        // Data bits, LSB first.
        for k in 0..8 {
            let outcome = tx.on_falling_edge(&mut platform, &mut diag).unwrap();
            assert_eq!(outcome, TransmitOutcome::Continue);
            let expected = (0xEDu8 >> k) & 1 == 1;
            assert_eq!(platform.data_level(), expected);
        }

        // Parity bit: 0xED = 0b1110_1101 has six ones -> even -> parity bit 1.
        tx.on_falling_edge(&mut platform, &mut diag).unwrap();
        assert!(platform.data_level());

        // Stop bit: line released, floats high.
        tx.on_falling_edge(&mut platform, &mut diag).unwrap();
        assert!(platform.data_level());

        // Ack: device pulls data low.
        platform.set_data_level(false);
        let outcome = tx.on_falling_edge(&mut platform, &mut diag).unwrap();
        assert_eq!(outcome, TransmitOutcome::Done { device_acked: true });
    }

    #[test]
    fn missing_ack_reports_send_frame_error() {
        let mut platform = MockPlatform::new();
        platform.set_data_level(true);
        let mut diag = crate::diagnostics::EventRecorder::<4>::new();
        let mut tx = Transmitter::new();
        tx.load(0x00);
        for _ in 0..11 {
            tx.on_falling_edge(&mut platform, &mut diag).unwrap();
        }
        let outcome = tx.on_falling_edge(&mut platform, &mut diag).unwrap();
        assert_eq!(outcome, TransmitOutcome::Done { device_acked: false });
        assert_eq!(diag.len(), 1);
    }
}
