//! Public surface: [`Ps2Keyboard`], the type applications construct and
//! drive (spec §4.7).
//!
//! Hardware falling-edge interrupts rarely carry a context pointer back to
//! the instance that should handle them, so the platform's vector is
//! expected to forward into [`Ps2Keyboard::on_clock_falling_edge`] (see
//! [`crate::platform::Platform::install_clock_falling_edge_interrupt`]).
//! Since a real vector table is application-specific and this crate stays
//! generic over `Platform`, the table this module owns doesn't hold
//! instance pointers (that routing lives in application code); it only
//! tracks which clock-pin identities are currently claimed, so constructing
//! a second driver on a pin already in use is rejected rather than silently
//! producing two instances racing the same interrupt.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec as ClaimedPins;
use portable_atomic::{AtomicBool, Ordering};

use crate::buffer::OutputBuffer;
use crate::commands::{command, reply};
use crate::config::Ps2Config;
use crate::diagnostics::Diagnostics;
use crate::error::Ps2Error;
use crate::platform::Platform;
use crate::receiver::Receiver;
use crate::scancode::ScanCode;
use crate::sequencer;
use crate::switcher;
use crate::time;
use crate::transmitter::{TransmitOutcome, Transmitter};

const MAX_CLAIMED_PINS: usize = 8;

static CLAIMED_PINS: Mutex<RefCell<ClaimedPins<u32, MAX_CLAIMED_PINS>>> =
    Mutex::new(RefCell::new(ClaimedPins::new()));

fn claim_pin(id: u32) -> Result<(), ()> {
    critical_section::with(|cs| {
        let mut pins = CLAIMED_PINS.borrow(cs).borrow_mut();
        if pins.iter().any(|&claimed| claimed == id) {
            return Err(());
        }
        pins.push(id).map_err(|_| ())
    })
}

fn release_pin(id: u32) {
    critical_section::with(|cs| {
        let mut pins = CLAIMED_PINS.borrow(cs).borrow_mut();
        if let Some(pos) = pins.iter().position(|&claimed| claimed == id) {
            pins.swap_remove(pos);
        }
    });
}

/// Which state machine the next clock edge should be routed to. Generalises
/// the teacher's `HOST_MODE` flag to a type the dispatcher and the
/// sequencer both read.
pub(crate) struct ModeFlag(AtomicBool);

impl ModeFlag {
    fn new() -> Self {
        ModeFlag(AtomicBool::new(false))
    }

    pub(crate) fn set_transmitting(&self, transmitting: bool) {
        self.0.store(transmitting, Ordering::SeqCst);
    }

    pub(crate) fn is_transmitting(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A PS/2 keyboard host driver bound to one clock/data pin pair.
///
/// `N` is the output buffer's capacity; `D` is the diagnostics sink. Owns
/// its `Platform` for its lifetime (spec's "Lifecycle" paragraph, §3): the
/// pins and the clock interrupt vector belong exclusively to this instance
/// until it's dropped, at which point its clock-pin identity is released
/// back to the claim table.
pub struct Ps2Keyboard<P: Platform, const N: usize, D: Diagnostics> {
    platform: P,
    receiver: Receiver,
    transmitter: Transmitter,
    buffer: OutputBuffer<N>,
    mode: ModeFlag,
    config: Ps2Config,
    diagnostics: D,
    clock_pin_id: u32,
}

impl<P: Platform, const N: usize, D: Diagnostics> Ps2Keyboard<P, N, D> {
    /// Constructs a driver bound to `clock_pin_id`, a caller-chosen value
    /// identifying the physical clock pin (e.g. a GPIO number). Returns
    /// [`Ps2Error::PinAlreadyClaimed`] if a driver for that identity already
    /// exists and hasn't been dropped.
    ///
    /// The instance starts in the *uninitialised* lifecycle state; call
    /// [`Self::begin`] to transition to *listening*.
    pub fn new(
        platform: P,
        clock_pin_id: u32,
        config: Ps2Config,
        diagnostics: D,
    ) -> Result<Self, Ps2Error<P::Error>> {
        claim_pin(clock_pin_id).map_err(|()| Ps2Error::PinAlreadyClaimed)?;
        Ok(Ps2Keyboard {
            platform,
            receiver: Receiver::new(),
            transmitter: Transmitter::new(),
            buffer: OutputBuffer::new(),
            mode: ModeFlag::new(),
            config,
            diagnostics,
            clock_pin_id,
        })
    }

    /// Configures both pins as input-with-pull-up and arms the receiver
    /// (spec 4.7: `begin`).
    pub fn begin(&mut self) -> Result<(), Ps2Error<P::Error>> {
        self.platform.data_set_input_pullup()?;
        self.platform.clock_set_input_pullup()?;
        self.mode.set_transmitting(false);
        self.platform.install_clock_falling_edge_interrupt();
        Ok(())
    }

    /// The interrupt dispatch entry point: call this, and nothing else,
    /// from the platform's falling-edge handler. Routes the edge to
    /// whichever state machine currently owns the line.
    pub fn on_clock_falling_edge(&mut self) -> Result<(), P::Error> {
        if self.mode.is_transmitting() {
            let outcome = self
                .transmitter
                .on_falling_edge(&mut self.platform, &mut self.diagnostics)?;
            if let TransmitOutcome::Done { .. } = outcome {
                self.receiver.reset();
                self.buffer.clear();
                self.mode.set_transmitting(false);
            }
        } else {
            let now = self.platform.micros();
            let data_bit = self.platform.data_read()?;
            self.receiver
                .on_falling_edge(data_bit, now, &mut self.buffer, &mut self.diagnostics);
        }
        Ok(())
    }

    fn send_command(&mut self, cmd: u8, args: &[u8]) -> Result<bool, P::Error> {
        sequencer::send_command(
            &mut self.platform,
            &mut self.transmitter,
            &mut self.receiver,
            &mut self.buffer,
            &self.mode,
            &self.config,
            &mut self.diagnostics,
            cmd,
            args,
        )
    }

    fn next_reply_byte(&mut self) -> Option<u8> {
        let response = sequencer::expect_response(
            &self.platform,
            &self.buffer,
            &mut self.receiver,
            self.config.ack_timeout_millis,
        );
        response.raw().inspect(|_| {
            critical_section::with(|_| {
                self.buffer.pop();
            });
        })
    }

    /// Waits up to `timeout_millis` for the self-test-passed sentinel (spec
    /// 4.7: `awaitStartup`). Never fails the call itself; a failed self-test
    /// is surfaced only through the diagnostics sink and a `false` return.
    pub fn await_startup(&mut self, timeout_millis: u32) -> bool {
        let start = self.platform.millis();
        loop {
            let popped = critical_section::with(|_| self.buffer.pop());
            match popped {
                Some(reply::SELF_TEST_PASSED) => return true,
                Some(reply::SELF_TEST_FAILED_1) | Some(reply::SELF_TEST_FAILED_2) => {
                    self.diagnostics.startup_failure();
                    return false;
                }
                Some(_) => continue,
                None => {
                    if !time::before_deadline(self.platform.millis(), start, timeout_millis) {
                        return false;
                    }
                }
            }
        }
    }

    /// Sends the reset command, clears the buffer, then waits for
    /// self-test-passed (spec 4.7: `reset`).
    pub fn reset(&mut self, timeout_millis: u32) -> Result<bool, P::Error> {
        if !self.send_command(command::RESET, &[])? {
            return Ok(false);
        }
        critical_section::with(|_| self.buffer.clear());
        Ok(self.await_startup(timeout_millis))
    }

    /// The application's primary entry point (spec 4.6/4.7: `readScanCode`).
    pub fn read_scan_code(&mut self) -> Result<ScanCode, P::Error> {
        sequencer::read_scan_code(
            &mut self.platform,
            &mut self.transmitter,
            &mut self.receiver,
            &mut self.buffer,
            &self.mode,
            &self.config,
            &mut self.diagnostics,
        )
    }

    /// Sends the LED status byte: bit 0 scroll lock, bit 1 num lock, bit 2
    /// caps lock; higher bits of `mask` are ignored.
    pub fn send_led_status(&mut self, mask: u8) -> Result<bool, P::Error> {
        self.send_command(command::SET_LEDS, &[mask & 0b111])
    }

    /// Reads the two-byte device ID, composed MSB-first. Any missing byte
    /// (no ACK, or a reply timeout) yields `0xFFFF`.
    pub fn read_id(&mut self) -> Result<u16, P::Error> {
        if !sequencer::send_data(
            &mut self.platform,
            &mut self.transmitter,
            &mut self.receiver,
            &mut self.buffer,
            &self.mode,
            &self.config,
            &mut self.diagnostics,
            command::READ_ID,
        )? {
            return Ok(0xFFFF);
        }
        match (self.next_reply_byte(), self.next_reply_byte()) {
            (Some(msb), Some(lsb)) => Ok(((msb as u16) << 8) | lsb as u16),
            _ => Ok(0xFFFF),
        }
    }

    /// Reads back the active scan-code set. `None` if there was no ACK, no
    /// reply, or the reply wasn't one of {1, 2, 3}.
    pub fn get_scan_code_set(&mut self) -> Result<Option<u8>, P::Error> {
        if !self.send_command(command::SET_SCANCODE_SET, &[crate::commands::READ_SCANCODE_SET_SUBCOMMAND])? {
            return Ok(None);
        }
        Ok(self.next_reply_byte().filter(|set| (1..=3).contains(set)))
    }

    /// Sets the active scan-code set; `n` should be 1, 2, or 3.
    pub fn set_scan_code_set(&mut self, n: u8) -> Result<bool, P::Error> {
        self.send_command(command::SET_SCANCODE_SET, &[n])
    }

    /// Sends the echo command. Unlike every other command, no ACK is
    /// expected — the device replies with its own echo byte directly (spec
    /// 4.7, `echo`'s note).
    pub fn echo(&mut self) -> Result<bool, P::Error> {
        self.mode.set_transmitting(true);
        switcher::begin_transmission(
            &mut self.platform,
            &mut self.transmitter,
            &mut self.receiver,
            &mut self.buffer,
            command::ECHO,
            self.config.inhibit_micros,
        )?;
        self.diagnostics.sent_byte(command::ECHO);
        let echoed = sequencer::expect_response_matching(
            &self.platform,
            &mut self.buffer,
            &mut self.receiver,
            &mut self.diagnostics,
            reply::ECHO,
            self.config.ack_timeout_millis,
        );
        if !echoed {
            critical_section::with(|_| {
                self.receiver.reset();
                self.buffer.clear();
            });
            self.mode.set_transmitting(false);
        }
        Ok(echoed)
    }

    /// Sets the typematic repeat rate (0 = fastest, ~30 cps, to 31 =
    /// slowest, ~2 cps) and the initial delay (0 = 250 ms to 3 = 1000 ms).
    pub fn set_typematic_rate_and_delay(&mut self, rate5: u8, delay2: u8) -> Result<bool, P::Error> {
        let byte = (rate5 & 0b1_1111) | ((delay2 & 0b11) << 5);
        self.send_command(command::SET_TYPEMATIC, &[byte])
    }

    pub fn enable(&mut self) -> Result<bool, P::Error> {
        self.send_command(command::ENABLE, &[])
    }

    pub fn disable(&mut self) -> Result<bool, P::Error> {
        self.send_command(command::DISABLE, &[])
    }

    pub fn reset_to_defaults(&mut self) -> Result<bool, P::Error> {
        self.send_command(command::USE_DEFAULTS, &[])
    }

    /// Scan-code-set-3 only; sets 1 and 2 silently accept and ignore this.
    pub fn enable_break_and_typematic(&mut self) -> Result<bool, P::Error> {
        self.send_command(command::ENABLE_BREAK_AND_TYPEMATIC_ALL, &[])
    }

    /// Scan-code-set-3 only. Leaves the keyboard disabled; caller must
    /// re-enable (spec 4.7).
    pub fn disable_break_and_typematic(&mut self) -> Result<bool, P::Error> {
        self.send_command(command::DISABLE_BREAK_AND_TYPEMATIC_ALL, &[])
    }

    pub fn disable_break_codes(&mut self) -> Result<bool, P::Error> {
        self.send_command(command::DISABLE_BREAK_ALL, &[])
    }

    pub fn disable_typematic(&mut self) -> Result<bool, P::Error> {
        self.send_command(command::DISABLE_TYPEMATIC_ALL, &[])
    }

    /// Per-key variants: `keys` follows the command byte. Leaves the
    /// keyboard disabled afterwards; caller must re-enable.
    pub fn disable_break_codes_for(&mut self, keys: &[u8]) -> Result<bool, P::Error> {
        self.send_command(command::DISABLE_BREAK_FOR_SPECIFIC, keys)
    }

    pub fn disable_typematic_for(&mut self, keys: &[u8]) -> Result<bool, P::Error> {
        self.send_command(command::DISABLE_TYPEMATIC_FOR_SPECIFIC, keys)
    }

    pub fn disable_break_and_typematic_for(&mut self, keys: &[u8]) -> Result<bool, P::Error> {
        self.send_command(command::DISABLE_BREAK_AND_TYPEMATIC_FOR_SPECIFIC, keys)
    }

    /// Mutable access to the diagnostics sink, e.g. to drain an
    /// [`crate::diagnostics::EventRecorder`].
    pub fn diagnostics(&mut self) -> &mut D {
        &mut self.diagnostics
    }
}

impl<P: Platform, const N: usize, D: Diagnostics> Drop for Ps2Keyboard<P, N, D> {
    fn drop(&mut self) {
        release_pin(self.clock_pin_id);
    }
}
