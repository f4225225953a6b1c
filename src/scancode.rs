//! The tagged view over a received byte (spec §3, Design Notes).
//!
//! The output buffer itself only ever stores raw `u8`s — disambiguating a
//! `0xFA` as an ACK rather than an ordinary scan code depends on *where* in
//! the protocol it arrived, not on its value alone. [`ScanCode`] is the
//! positional tagging the command sequencer and public surface apply; the
//! interrupt-side receiver never constructs one.

use crate::commands::reply;

/// A byte received from the keyboard, tagged with the well-known reply
/// sentinels spec §3/§6 name. Values that don't match a sentinel in a
/// position where one is expected are just [`ScanCode::Raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanCode {
    /// The output buffer was empty.
    Empty,
    /// A framing error was detected and recovery was initiated.
    Garbled,
    Ack,
    Resend,
    Echo,
    SelfTestPassed,
    /// Carries whichever of 0xFC/0xFD actually arrived.
    SelfTestFailed(u8),
    ExtendedPrefix,
    BreakPrefix,
    /// An ordinary scan code byte.
    Raw(u8),
}

impl ScanCode {
    /// Tags a raw byte as the sentinel spec §4.7/§6 would read it as when it
    /// appears in that position. Used by the command sequencer, which knows
    /// from context whether it is waiting on an ACK, a reply byte, or a plain
    /// scan code.
    pub fn from_raw(byte: u8) -> ScanCode {
        match byte {
            reply::ACK => ScanCode::Ack,
            reply::RESEND => ScanCode::Resend,
            reply::ECHO => ScanCode::Echo,
            reply::SELF_TEST_PASSED => ScanCode::SelfTestPassed,
            reply::SELF_TEST_FAILED_1 | reply::SELF_TEST_FAILED_2 => ScanCode::SelfTestFailed(byte),
            reply::EXTENDED_PREFIX => ScanCode::ExtendedPrefix,
            reply::BREAK_PREFIX => ScanCode::BreakPrefix,
            other => ScanCode::Raw(other),
        }
    }

    /// The underlying byte, if any (`Empty` and `Garbled` have none).
    pub fn raw(self) -> Option<u8> {
        match self {
            ScanCode::Empty | ScanCode::Garbled => None,
            ScanCode::Ack => Some(reply::ACK),
            ScanCode::Resend => Some(reply::RESEND),
            ScanCode::Echo => Some(reply::ECHO),
            ScanCode::SelfTestPassed => Some(reply::SELF_TEST_PASSED),
            ScanCode::SelfTestFailed(b) => Some(b),
            ScanCode::ExtendedPrefix => Some(reply::EXTENDED_PREFIX),
            ScanCode::BreakPrefix => Some(reply::BREAK_PREFIX),
            ScanCode::Raw(b) => Some(b),
        }
    }
}
