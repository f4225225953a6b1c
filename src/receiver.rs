//! Per-edge frame receiver state machine (spec §4.3).
//!
//! Every field here is interrupt-owned: it is mutated only from the
//! clock-edge handler, except on the foreground recovery path in
//! [`crate::sequencer`], which must mask the clock interrupt first (spec
//! Design Notes).

use crate::buffer::OutputBuffer;
use crate::diagnostics::Diagnostics;

/// Assembles one 11-bit frame (start/8 data/parity/stop) per falling clock
/// edge and validates it.
pub struct Receiver {
    bit_count: u8,
    accumulator: u8,
    /// `true` when the number of data-bit ones seen so far is odd.
    running_parity_odd: bool,
    framing_error: bool,
    last_edge_micros: u32,
    last_failure_micros: u32,
    /// The bit counter's value at the row where the most recent framing
    /// error was detected (0 = bad start bit, 9 = bad parity, 10 = bad stop
    /// bit) — not the live counter, which keeps cycling through whatever
    /// arrives next while the flag stays latched.
    failure_bit_count: u8,
}

impl Receiver {
    pub const fn new() -> Self {
        Receiver {
            bit_count: 0,
            accumulator: 0,
            running_parity_odd: false,
            framing_error: false,
            last_edge_micros: 0,
            last_failure_micros: 0,
            failure_bit_count: 0,
        }
    }

    pub fn framing_error(&self) -> bool {
        self.framing_error
    }

    pub fn last_failure_micros(&self) -> u32 {
        self.last_failure_micros
    }

    pub fn failure_bit_count(&self) -> u8 {
        self.failure_bit_count
    }

    /// Clears the latch without touching the rest of the assembly state.
    /// Foreground-only, called with the clock interrupt masked.
    pub fn clear_framing_error(&mut self) {
        self.framing_error = false;
    }

    /// Full reset: counter, accumulator, parity and the error latch.
    /// Foreground-only (spurious-glitch recovery, or re-arming after a
    /// transmission), called with the clock interrupt masked.
    pub fn reset(&mut self) {
        self.bit_count = 0;
        self.accumulator = 0;
        self.running_parity_odd = false;
        self.framing_error = false;
    }

    fn latch_error(&mut self, now_micros: u32) {
        self.framing_error = true;
        self.last_failure_micros = now_micros;
        self.failure_bit_count = self.bit_count;
    }

    /// Handles one falling clock edge: samples `data_bit` (already read by
    /// the caller, per spec's ~30 μs data-valid window) and advances the
    /// assembly. Pushes the accepted byte to `buffer` on a clean stop bit.
    pub fn on_falling_edge<const N: usize>(
        &mut self,
        data_bit: bool,
        now_micros: u32,
        buffer: &mut OutputBuffer<N>,
        diagnostics: &mut impl Diagnostics,
    ) {
        self.last_edge_micros = now_micros;

        match self.bit_count {
            0 => {
                // Start bit. Correct ones implicitly clear a stale latch
                // from a prior frame; a bad one sets it regardless.
                if data_bit {
                    self.latch_error(now_micros);
                    diagnostics.packet_did_not_start_with_zero();
                } else {
                    self.framing_error = false;
                }
                self.accumulator = 0;
                self.running_parity_odd = false;
                self.bit_count = 1;
            }
            1..=8 => {
                let k = self.bit_count - 1;
                if data_bit {
                    self.accumulator |= 1 << k;
                    self.running_parity_odd = !self.running_parity_odd;
                }
                self.bit_count += 1;
            }
            9 => {
                // Odd parity over the 9-bit group: the parity bit must be
                // the complement of whether the data bits alone were odd.
                let expected = !self.running_parity_odd;
                if data_bit != expected {
                    self.latch_error(now_micros);
                    diagnostics.parity_error();
                }
                self.bit_count = 10;
            }
            10 => {
                if !data_bit {
                    self.latch_error(now_micros);
                    diagnostics.packet_did_not_end_with_one();
                }
                if !self.framing_error {
                    diagnostics.received_byte(self.accumulator);
                    buffer.push(self.accumulator, diagnostics);
                }
                self.bit_count = 0;
                self.accumulator = 0;
            }
            _ => unreachable!("bit counter must stay within 0..=10"),
        }
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoopDiagnostics;

    fn send_frame<const N: usize>(
        recv: &mut Receiver,
        buffer: &mut OutputBuffer<N>,
        diag: &mut impl Diagnostics,
        byte: u8,
        corrupt_parity: bool,
        corrupt_stop: bool,
        corrupt_start: bool,
    ) {
        let mut t = 0u32;
        t += 70;
        recv.on_falling_edge(corrupt_start, t, buffer, diag); // start bit
        let mut ones = 0u32;
        for k in 0..8 {
            let bit = (byte >> k) & 1 == 1;
            if bit {
                ones += 1;
            }
            t += 70;
            recv.on_falling_edge(bit, t, buffer, diag);
        }
        let mut parity_bit = ones % 2 == 0; // odd parity: 1 when data-ones even
        if corrupt_parity {
            parity_bit = !parity_bit;
        }
        t += 70;
        recv.on_falling_edge(parity_bit, t, buffer, diag);
        t += 70;
        recv.on_falling_edge(!corrupt_stop, t, buffer, diag); // stop bit
    }

    #[test]
    fn clean_frame_is_pushed_lsb_first() {
        let mut recv = Receiver::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mut diag = NoopDiagnostics;
        send_frame(&mut recv, &mut buf, &mut diag, 0x5A, false, false, false);
        assert!(!recv.framing_error());
        assert_eq!(buf.pop(), Some(0x5A));
    }

    #[test]
    fn bad_start_bit_sets_latch_and_drops_byte() {
        let mut recv = Receiver::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mut diag = NoopDiagnostics;
        send_frame(&mut recv, &mut buf, &mut diag, 0x41, false, false, true);
        assert!(recv.framing_error());
        assert_eq!(recv.failure_bit_count(), 0);
        assert_eq!(buf.pop(), None);
    }

    #[test]
    fn bad_parity_sets_latch_and_drops_byte() {
        let mut recv = Receiver::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mut diag = NoopDiagnostics;
        send_frame(&mut recv, &mut buf, &mut diag, 0x41, true, false, false);
        assert!(recv.framing_error());
        assert_eq!(recv.failure_bit_count(), 9);
        assert_eq!(buf.pop(), None);
    }

    #[test]
    fn bad_stop_bit_sets_latch_and_drops_byte() {
        let mut recv = Receiver::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mut diag = NoopDiagnostics;
        send_frame(&mut recv, &mut buf, &mut diag, 0x41, false, true, false);
        assert!(recv.framing_error());
        assert_eq!(recv.failure_bit_count(), 10);
        assert_eq!(buf.pop(), None);
    }

    #[test]
    fn good_start_bit_implicitly_clears_stale_latch() {
        let mut recv = Receiver::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mut diag = NoopDiagnostics;
        send_frame(&mut recv, &mut buf, &mut diag, 0x41, true, false, false);
        assert!(recv.framing_error());
        send_frame(&mut recv, &mut buf, &mut diag, 0x3C, false, false, false);
        assert!(!recv.framing_error());
        assert_eq!(buf.pop(), Some(0x3C));
    }
}
