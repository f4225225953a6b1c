//! Passive event sink (spec §6).
//!
//! Every method must be callable from both the interrupt and the foreground
//! and must never block — they're simple recorders, not logging I/O. Default
//! bodies are no-ops so an implementor only overrides the events it cares
//! about.

/// Passive diagnostics sink.
pub trait Diagnostics {
    fn packet_did_not_start_with_zero(&mut self) {}
    fn parity_error(&mut self) {}
    fn packet_did_not_end_with_one(&mut self) {}
    fn send_frame_error(&mut self) {}
    fn buffer_overflow(&mut self) {}
    fn clock_line_glitch(&mut self, bits_received: u8) {
        let _ = bits_received;
    }
    fn incorrect_response(&mut self, got: u8, expected: u8) {
        let _ = (got, expected);
    }
    fn no_response(&mut self, expected: u8) {
        let _ = expected;
    }
    fn no_translation_for_key(&mut self, is_extended: bool, code: u8) {
        let _ = (is_extended, code);
    }
    fn startup_failure(&mut self) {}
    fn sent_byte(&mut self, byte: u8) {
        let _ = byte;
    }
    fn received_byte(&mut self, byte: u8) {
        let _ = byte;
    }
}

/// The default: discards every event.
#[derive(Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

/// One recorded diagnostic event, as accumulated by [`EventRecorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticEvent {
    PacketDidNotStartWithZero,
    ParityError,
    PacketDidNotEndWithOne,
    SendFrameError,
    BufferOverflow,
    ClockLineGlitch(u8),
    IncorrectResponse { got: u8, expected: u8 },
    NoResponse { expected: u8 },
    NoTranslationForKey { is_extended: bool, code: u8 },
    StartupFailure,
    SentByte(u8),
    ReceivedByte(u8),
}

/// Buffered recorder for offline dump. Holds the most recent `N` events;
/// the oldest is dropped once full, same drop-oldest policy as the output
/// buffer itself.
pub struct EventRecorder<const N: usize> {
    events: heapless::Deque<DiagnosticEvent, N>,
}

impl<const N: usize> EventRecorder<N> {
    pub const fn new() -> Self {
        EventRecorder {
            events: heapless::Deque::new(),
        }
    }

    fn record(&mut self, event: DiagnosticEvent) {
        if self.events.is_full() {
            self.events.pop_front();
        }
        // capacity is N > 0 and we just ensured room, so this cannot fail.
        let _ = self.events.push_back(event);
    }

    /// Drain all recorded events, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = DiagnosticEvent> + '_ {
        core::iter::from_fn(move || self.events.pop_front())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<const N: usize> Default for EventRecorder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Diagnostics for EventRecorder<N> {
    fn packet_did_not_start_with_zero(&mut self) {
        self.record(DiagnosticEvent::PacketDidNotStartWithZero);
    }
    fn parity_error(&mut self) {
        self.record(DiagnosticEvent::ParityError);
    }
    fn packet_did_not_end_with_one(&mut self) {
        self.record(DiagnosticEvent::PacketDidNotEndWithOne);
    }
    fn send_frame_error(&mut self) {
        self.record(DiagnosticEvent::SendFrameError);
    }
    fn buffer_overflow(&mut self) {
        self.record(DiagnosticEvent::BufferOverflow);
    }
    fn clock_line_glitch(&mut self, bits_received: u8) {
        self.record(DiagnosticEvent::ClockLineGlitch(bits_received));
    }
    fn incorrect_response(&mut self, got: u8, expected: u8) {
        self.record(DiagnosticEvent::IncorrectResponse { got, expected });
    }
    fn no_response(&mut self, expected: u8) {
        self.record(DiagnosticEvent::NoResponse { expected });
    }
    fn no_translation_for_key(&mut self, is_extended: bool, code: u8) {
        self.record(DiagnosticEvent::NoTranslationForKey { is_extended, code });
    }
    fn startup_failure(&mut self) {
        self.record(DiagnosticEvent::StartupFailure);
    }
    fn sent_byte(&mut self, byte: u8) {
        self.record(DiagnosticEvent::SentByte(byte));
    }
    fn received_byte(&mut self, byte: u8) {
        self.record(DiagnosticEvent::ReceivedByte(byte));
    }
}

/// Forwards every event to the `log` facade at `trace` level, in addition to
/// doing nothing else. Useful stacked with an [`EventRecorder`] via a small
/// wrapper when a host wants both a structured history and console output.
#[cfg(feature = "log")]
#[derive(Default)]
pub struct LogDiagnostics;

#[cfg(feature = "log")]
impl Diagnostics for LogDiagnostics {
    fn packet_did_not_start_with_zero(&mut self) {
        log::trace!("ps2: packet did not start with zero");
    }
    fn parity_error(&mut self) {
        log::trace!("ps2: parity error");
    }
    fn packet_did_not_end_with_one(&mut self) {
        log::trace!("ps2: packet did not end with one");
    }
    fn send_frame_error(&mut self) {
        log::trace!("ps2: send frame error");
    }
    fn buffer_overflow(&mut self) {
        log::trace!("ps2: output buffer overflow");
    }
    fn clock_line_glitch(&mut self, bits_received: u8) {
        log::trace!("ps2: clock line glitch after {bits_received} bits");
    }
    fn incorrect_response(&mut self, got: u8, expected: u8) {
        log::trace!("ps2: incorrect response: got {got:#04x}, expected {expected:#04x}");
    }
    fn no_response(&mut self, expected: u8) {
        log::trace!("ps2: no response, expected {expected:#04x}");
    }
    fn no_translation_for_key(&mut self, is_extended: bool, code: u8) {
        log::trace!("ps2: no translation for key (extended={is_extended}, code={code:#04x})");
    }
    fn startup_failure(&mut self) {
        log::trace!("ps2: startup self-test failed");
    }
    fn sent_byte(&mut self, byte: u8) {
        log::trace!("ps2: sent byte {byte:#04x}");
    }
    fn received_byte(&mut self, byte: u8) {
        log::trace!("ps2: received byte {byte:#04x}");
    }
}

/// Forwards every event to the `defmt` facade at `trace` level. Alternative
/// to [`LogDiagnostics`] for targets without a `std` logger; never both at
/// once, since they'd double-report the same events.
#[cfg(feature = "defmt")]
#[derive(Default)]
pub struct DefmtDiagnostics;

#[cfg(feature = "defmt")]
impl Diagnostics for DefmtDiagnostics {
    fn packet_did_not_start_with_zero(&mut self) {
        defmt::trace!("ps2: packet did not start with zero");
    }
    fn parity_error(&mut self) {
        defmt::trace!("ps2: parity error");
    }
    fn packet_did_not_end_with_one(&mut self) {
        defmt::trace!("ps2: packet did not end with one");
    }
    fn send_frame_error(&mut self) {
        defmt::trace!("ps2: send frame error");
    }
    fn buffer_overflow(&mut self) {
        defmt::trace!("ps2: output buffer overflow");
    }
    fn clock_line_glitch(&mut self, bits_received: u8) {
        defmt::trace!("ps2: clock line glitch after {} bits", bits_received);
    }
    fn incorrect_response(&mut self, got: u8, expected: u8) {
        defmt::trace!("ps2: incorrect response: got {:#04x}, expected {:#04x}", got, expected);
    }
    fn no_response(&mut self, expected: u8) {
        defmt::trace!("ps2: no response, expected {:#04x}", expected);
    }
    fn no_translation_for_key(&mut self, is_extended: bool, code: u8) {
        defmt::trace!("ps2: no translation for key (extended={}, code={:#04x})", is_extended, code);
    }
    fn startup_failure(&mut self) {
        defmt::trace!("ps2: startup self-test failed");
    }
    fn sent_byte(&mut self, byte: u8) {
        defmt::trace!("ps2: sent byte {:#04x}", byte);
    }
    fn received_byte(&mut self, byte: u8) {
        defmt::trace!("ps2: received byte {:#04x}", byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_drops_oldest_when_full() {
        let mut rec: EventRecorder<2> = EventRecorder::new();
        rec.sent_byte(1);
        rec.sent_byte(2);
        rec.sent_byte(3);
        let events: heapless::Vec<DiagnosticEvent, 4> = rec.drain().collect();
        assert_eq!(
            events.as_slice(),
            &[DiagnosticEvent::SentByte(2), DiagnosticEvent::SentByte(3)]
        );
    }
}
