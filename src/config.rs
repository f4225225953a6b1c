//! Runtime-tunable timing budgets (spec §4.5–§4.7).
//!
//! Buffer capacity is a const generic, not runtime config — it's fixed at
//! compile time per spec's "N slots" (4.2). Everything here is a duration a
//! slower or faster keyboard, or a noisier board, might need to adjust.

/// Timing budgets used throughout the driver. `Default` gives spec's
/// recommended values.
#[derive(Debug, Clone, Copy)]
pub struct Ps2Config {
    /// Minimum time to hold the clock line low before driving data, to
    /// inhibit the keyboard from starting its own transmission (spec 4.5:
    /// "≥100 μs, 120 μs recommended").
    pub inhibit_micros: u32,
    /// How long [`crate::sequencer`]'s `sendData` waits for an ACK after the
    /// last bit of a command (spec 4.6: "≈10 ms").
    pub ack_timeout_millis: u32,
    /// Default `awaitStartup` budget (spec 4.7: 750 ms).
    pub startup_timeout_millis: u32,
    /// Default `reset` budget (spec 4.7: 1000 ms).
    pub reset_timeout_millis: u32,
    /// How long a framing error must sit latched before `readScanCode`
    /// treats it as more than a transient spurious edge (spec 4.6, point 1:
    /// 200 μs).
    pub glitch_settle_micros: u32,
    /// Bit-counter threshold above which a framing error looks like a real,
    /// partially-received byte rather than a spurious clock edge (spec 4.6,
    /// point 2/3).
    pub glitch_bit_threshold: u8,
}

impl Default for Ps2Config {
    fn default() -> Self {
        Ps2Config {
            inhibit_micros: 120,
            ack_timeout_millis: 10,
            startup_timeout_millis: 750,
            reset_timeout_millis: 1000,
            glitch_settle_micros: 200,
            glitch_bit_threshold: 3,
        }
    }
}
