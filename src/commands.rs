//! Wire-level command and reply byte codes (spec §6).

/// Host-to-device command bytes.
pub mod command {
    pub const RESET: u8 = 0xFF;
    pub const RESEND: u8 = 0xFE;
    pub const DISABLE_BREAK_AND_TYPEMATIC_FOR_SPECIFIC: u8 = 0xFD;
    pub const DISABLE_TYPEMATIC_FOR_SPECIFIC: u8 = 0xFC;
    pub const DISABLE_BREAK_FOR_SPECIFIC: u8 = 0xFB;
    pub const ENABLE_BREAK_AND_TYPEMATIC_ALL: u8 = 0xFA;
    pub const DISABLE_BREAK_AND_TYPEMATIC_ALL: u8 = 0xF9;
    pub const DISABLE_TYPEMATIC_ALL: u8 = 0xF8;
    pub const DISABLE_BREAK_ALL: u8 = 0xF7;
    pub const USE_DEFAULTS: u8 = 0xF6;
    pub const DISABLE: u8 = 0xF5;
    pub const ENABLE: u8 = 0xF4;
    pub const SET_TYPEMATIC: u8 = 0xF3;
    pub const READ_ID: u8 = 0xF2;
    pub const SET_SCANCODE_SET: u8 = 0xF0;
    pub const ECHO: u8 = 0xEE;
    pub const SET_LEDS: u8 = 0xED;
}

/// Device-to-host reply bytes. These share the scan-code byte namespace;
/// disambiguation by the command sequencer is positional, not by value.
pub mod reply {
    pub const ACK: u8 = 0xFA;
    pub const ECHO: u8 = 0xEE;
    pub const RESEND: u8 = 0xFE;
    pub const SELF_TEST_PASSED: u8 = 0xAA;
    pub const SELF_TEST_FAILED_1: u8 = 0xFC;
    pub const SELF_TEST_FAILED_2: u8 = 0xFD;
    pub const EXTENDED_PREFIX: u8 = 0xE0;
    pub const BREAK_PREFIX: u8 = 0xF0;
}

/// Subcommand argument for [`command::SET_SCANCODE_SET`] that reads back the
/// current set instead of writing a new one.
pub const READ_SCANCODE_SET_SUBCOMMAND: u8 = 0x00;
