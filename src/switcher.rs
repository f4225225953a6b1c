//! Direction switcher: the host-to-device request-to-send handshake that
//! turns a listening receiver into an armed transmitter (spec §4.5).

use crate::buffer::OutputBuffer;
use crate::platform::Platform;
use crate::receiver::Receiver;
use crate::transmitter::Transmitter;

/// Runs the six-step inhibit/request-to-send sequence and leaves the
/// transmitter loaded and the clock released, ready for the device to drive
/// the edges that clock the byte out (spec 4.4). The caller is responsible
/// for flipping whatever dispatch-mode flag routes subsequent edges to the
/// transmitter instead of the receiver — that's safe to do at any point
/// before this returns, since no edges arrive while the clock interrupt is
/// uninstalled.
pub fn begin_transmission<P: Platform, const N: usize>(
    platform: &mut P,
    transmitter: &mut Transmitter,
    receiver: &mut Receiver,
    buffer: &mut OutputBuffer<N>,
    byte: u8,
    inhibit_micros: u32,
) -> Result<(), P::Error> {
    platform.uninstall_clock_falling_edge_interrupt();

    platform.clock_drive_low()?;
    platform.busy_wait_micros(inhibit_micros);

    transmitter.load(byte);
    receiver.clear_framing_error();
    buffer.clear();

    platform.install_clock_falling_edge_interrupt();

    platform.data_drive_low()?;
    platform.clock_set_input_pullup()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoopDiagnostics;
    use crate::test_support::MockPlatform;

    #[test]
    fn leaves_clock_released_and_data_requesting() {
        let mut platform = MockPlatform::new();
        let mut tx = Transmitter::new();
        let mut rx = Receiver::new();
        let mut buf: OutputBuffer<4> = OutputBuffer::new();
        let mut diag = NoopDiagnostics;
        buf.push(0xAA, &mut diag);

        begin_transmission(&mut platform, &mut tx, &mut rx, &mut buf, 0xED, 120).unwrap();

        assert!(platform.clock_level());
        assert!(!platform.data_level());
        assert!(platform.interrupt_installed());
        assert_eq!(buf.pop(), None);
    }
}
