//! 8254 PIT (Programmable Interval Timer) driver configuration.
//!
//! Register layout and oscillator arithmetic live in the ABI crate; this
//! module holds the driver-side policy knobs.

pub use pitmux_abi::arch::x86_64::pit::{
    PIT_BASE_FREQUENCY_HZ, PIT_MAX_COUNTDOWN, PIT_MAX_DELAY_NS, PIT_MIN_FREQUENCY_HZ,
    PIT_TICK_NS, PIT_ZERO_COUNTDOWN_TICKS,
};

// ============================================================================
// Frequency Constants
// ============================================================================

/// Tick frequency used by `pit_init(0)` (Hz)
pub const PIT_DEFAULT_FREQUENCY_HZ: u32 = 100;

// ============================================================================
// IRQ Assignment
// ============================================================================

/// PIT channel 0 is connected to legacy IRQ 0
pub const PIT_IRQ_LINE: u8 = 0;

// ============================================================================
// Diagnostics
// ============================================================================

/// Number of leading ticks logged at debug level
pub(crate) const PIT_LOGGED_TICKS: u64 = 3;
