//! Foreground command/response engine (spec §4.6).
//!
//! Pure functions rather than a struct: all the state they need already
//! lives on [`crate::driver::Ps2Keyboard`], which calls into here. Kept as
//! its own module because it's a distinct concern from the public surface
//! that calls it (spec names it as its own 20%-share component).

use crate::buffer::OutputBuffer;
use crate::commands::{command, reply};
use crate::config::Ps2Config;
use crate::diagnostics::Diagnostics;
use crate::driver::ModeFlag;
use crate::platform::Platform;
use crate::receiver::Receiver;
use crate::scancode::ScanCode;
use crate::switcher;
use crate::time;
use crate::transmitter::Transmitter;

/// Foreground wait for the next received byte, peeking rather than popping
/// (spec 4.6). Returns [`ScanCode::Garbled`] (clearing the latch) if the
/// buffer stays empty while the framing-error flag is set, or
/// [`ScanCode::Empty`] on timeout.
pub fn expect_response<P: Platform, const N: usize>(
    platform: &P,
    buffer: &OutputBuffer<N>,
    receiver: &mut Receiver,
    timeout_millis: u32,
) -> ScanCode {
    let start = platform.millis();
    loop {
        let (peeked, framing_error) =
            critical_section::with(|_| (buffer.peek(), receiver.framing_error()));
        if let Some(byte) = peeked {
            return ScanCode::from_raw(byte);
        }
        if framing_error {
            critical_section::with(|_| receiver.clear_framing_error());
            return ScanCode::Garbled;
        }
        if !time::before_deadline(platform.millis(), start, timeout_millis) {
            return ScanCode::Empty;
        }
    }
}

/// Typed form: waits for `expected`, popping it on a match. Leaves a
/// mismatched byte queued so the caller (or the next poll) can still see
/// it.
pub fn expect_response_matching<P: Platform, const N: usize>(
    platform: &P,
    buffer: &mut OutputBuffer<N>,
    receiver: &mut Receiver,
    diagnostics: &mut impl Diagnostics,
    expected: u8,
    timeout_millis: u32,
) -> bool {
    let response = expect_response(platform, buffer, receiver, timeout_millis);
    match response.raw() {
        Some(byte) if byte == expected => {
            critical_section::with(|_| {
                buffer.pop();
            });
            true
        }
        Some(got) => {
            diagnostics.incorrect_response(got, expected);
            false
        }
        None => {
            if matches!(response, ScanCode::Empty) {
                diagnostics.no_response(expected);
            }
            false
        }
    }
}

/// Sends one byte through the direction switcher and waits up to
/// `config.ack_timeout_millis` for an ACK (spec 4.6: `sendData`).
#[allow(clippy::too_many_arguments)]
pub fn send_data<P: Platform, const N: usize>(
    platform: &mut P,
    transmitter: &mut Transmitter,
    receiver: &mut Receiver,
    buffer: &mut OutputBuffer<N>,
    mode: &ModeFlag,
    config: &Ps2Config,
    diagnostics: &mut impl Diagnostics,
    byte: u8,
) -> Result<bool, P::Error> {
    mode.set_transmitting(true);
    switcher::begin_transmission(platform, transmitter, receiver, buffer, byte, config.inhibit_micros)?;
    diagnostics.sent_byte(byte);

    let acked = expect_response_matching(
        platform,
        buffer,
        receiver,
        diagnostics,
        reply::ACK,
        config.ack_timeout_millis,
    );
    if !acked {
        // Spec 4.6: on failure, re-arm the receiver. Guards against the
        // device never driving the clock at all, which would otherwise
        // leave the dispatcher stuck routing edges to the transmitter.
        critical_section::with(|_| {
            receiver.reset();
            buffer.clear();
        });
        mode.set_transmitting(false);
    }
    Ok(acked)
}

/// Chain of [`send_data`] calls, aborting on the first non-ACK (spec 4.6:
/// `sendCommand`).
#[allow(clippy::too_many_arguments)]
pub fn send_command<P: Platform, const N: usize>(
    platform: &mut P,
    transmitter: &mut Transmitter,
    receiver: &mut Receiver,
    buffer: &mut OutputBuffer<N>,
    mode: &ModeFlag,
    config: &Ps2Config,
    diagnostics: &mut impl Diagnostics,
    cmd: u8,
    args: &[u8],
) -> Result<bool, P::Error> {
    if !send_data(platform, transmitter, receiver, buffer, mode, config, diagnostics, cmd)? {
        return Ok(false);
    }
    for &arg in args {
        if !send_data(platform, transmitter, receiver, buffer, mode, config, diagnostics, arg)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The application's primary entry point (spec 4.6: `readScanCode`).
#[allow(clippy::too_many_arguments)]
pub fn read_scan_code<P: Platform, const N: usize>(
    platform: &mut P,
    transmitter: &mut Transmitter,
    receiver: &mut Receiver,
    buffer: &mut OutputBuffer<N>,
    mode: &ModeFlag,
    config: &Ps2Config,
    diagnostics: &mut impl Diagnostics,
) -> Result<ScanCode, P::Error> {
    loop {
        let popped = critical_section::with(|_| buffer.pop());
        match popped {
            Some(reply::SELF_TEST_PASSED) => continue,
            Some(byte @ (reply::SELF_TEST_FAILED_1 | reply::SELF_TEST_FAILED_2)) => {
                let _ = byte;
                diagnostics.startup_failure();
                continue;
            }
            Some(byte) => return Ok(ScanCode::from_raw(byte)),
            None => {
                let framing_error = critical_section::with(|_| receiver.framing_error());
                if !framing_error {
                    return Ok(ScanCode::Empty);
                }

                let last_failure = critical_section::with(|_| receiver.last_failure_micros());
                if time::elapsed_since(platform.micros(), last_failure) < config.glitch_settle_micros {
                    return Ok(ScanCode::Empty);
                }

                let failure_bit_count = critical_section::with(|_| receiver.failure_bit_count());
                if failure_bit_count > config.glitch_bit_threshold {
                    mode.set_transmitting(true);
                    switcher::begin_transmission(
                        platform,
                        transmitter,
                        receiver,
                        buffer,
                        command::RESEND,
                        config.inhibit_micros,
                    )?;
                    diagnostics.sent_byte(command::RESEND);
                } else {
                    critical_section::with(|_| {
                        diagnostics.clock_line_glitch(failure_bit_count);
                        receiver.reset();
                    });
                }
                return Ok(ScanCode::Garbled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoopDiagnostics;
    use crate::test_support::MockPlatform;

    #[test]
    fn expect_response_times_out_to_empty() {
        let platform = MockPlatform::new();
        let buf: OutputBuffer<4> = OutputBuffer::new();
        let mut recv = Receiver::new();
        let response = expect_response(&platform, &buf, &mut recv, 5);
        assert_eq!(response, ScanCode::Empty);
    }

    #[test]
    fn expect_response_sees_pushed_byte() {
        let platform = MockPlatform::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mut diag = NoopDiagnostics;
        buf.push(reply::ACK, &mut diag);
        let mut recv = Receiver::new();
        let response = expect_response(&platform, &buf, &mut recv, 50);
        assert_eq!(response, ScanCode::Ack);
    }

    #[test]
    fn read_scan_code_skips_stray_bat_pass() {
        let mut platform = MockPlatform::new();
        let mut tx = Transmitter::new();
        let mut rx = Receiver::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mode = ModeFlag::new();
        let config = Ps2Config::default();
        let mut diag = NoopDiagnostics;

        buf.push(reply::SELF_TEST_PASSED, &mut diag);
        buf.push(0x1C, &mut diag);

        let result =
            read_scan_code(&mut platform, &mut tx, &mut rx, &mut buf, &mode, &config, &mut diag)
                .unwrap();
        assert_eq!(result, ScanCode::Raw(0x1C));
    }

    #[test]
    fn read_scan_code_reports_startup_failure_and_continues() {
        let mut platform = MockPlatform::new();
        let mut tx = Transmitter::new();
        let mut rx = Receiver::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mode = ModeFlag::new();
        let config = Ps2Config::default();
        let mut diag = crate::diagnostics::EventRecorder::<4>::new();

        buf.push(reply::SELF_TEST_FAILED_1, &mut diag);

        let result =
            read_scan_code(&mut platform, &mut tx, &mut rx, &mut buf, &mode, &config, &mut diag)
                .unwrap();
        assert_eq!(result, ScanCode::Empty);
        assert_eq!(diag.len(), 1);
    }
}
