//! 8254 PIT register layout and oscillator arithmetic constants.

use bitflags::bitflags;

// =============================================================================
// Oscillator
// =============================================================================

/// Base oscillator frequency feeding every PIT channel (Hz).
pub const PIT_BASE_FREQUENCY_HZ: u32 = 1_193_180;

/// Nanoseconds per oscillator tick, rounded (1e9 / 1_193_180 = 838.09...).
pub const PIT_TICK_NS: u64 = 838;

/// Lowest frequency whose countdown still fits in 16 bits.
pub const PIT_MIN_FREQUENCY_HZ: u32 = 19;

/// Largest countdown that can be loaded without relying on the zero wrap.
pub const PIT_MAX_COUNTDOWN: u16 = u16::MAX;

/// Oscillator ticks covered by a loaded countdown of 0.
pub const PIT_ZERO_COUNTDOWN_TICKS: u32 = 0x1_0000;

/// Longest delay a single countdown can express.
pub const PIT_MAX_DELAY_NS: u64 = PIT_TICK_NS * PIT_MAX_COUNTDOWN as u64;

// =============================================================================
// Command Register
// =============================================================================

bitflags! {
    /// Mode/command byte written to port 0x43.
    ///
    /// Layout: bits 7-6 select the channel, bits 5-4 the access mode,
    /// bits 3-1 the operating mode, bit 0 BCD counting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PitCommand: u8 {
        /// BCD instead of binary counting. Never used by the driver.
        const BCD = 1 << 0;

        /// Mode 2: rate generator (one short pulse per period).
        const MODE_RATE_GENERATOR = 0b010 << 1;
        /// Mode 3: square wave generator.
        const MODE_SQUARE_WAVE = 0b011 << 1;

        /// Access mode: low byte then high byte.
        const ACCESS_LOHI = 0b11 << 4;

        /// Select channel 2. Channel 0 is the all-zero selector.
        const CHANNEL2 = 0b10 << 6;

        /// Channel 2, lobyte/hibyte, square wave: the tone channel byte (0xB6).
        const SECONDARY_SQUARE_WAVE = Self::CHANNEL2.bits()
            | Self::ACCESS_LOHI.bits()
            | Self::MODE_SQUARE_WAVE.bits();
    }
}

/// Operating modes the primary channel may be programmed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PitMode {
    /// Mode 2. Default for the tick interrupt.
    #[default]
    RateGenerator = 2,
    /// Mode 3.
    SquareWave = 3,
}

impl PitMode {
    /// Operating-mode bits of the command byte.
    #[inline]
    pub const fn command_bits(self) -> PitCommand {
        match self {
            Self::RateGenerator => PitCommand::MODE_RATE_GENERATOR,
            Self::SquareWave => PitCommand::MODE_SQUARE_WAVE,
        }
    }

    #[inline]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            3 => Self::SquareWave,
            _ => Self::RateGenerator,
        }
    }
}

impl PitCommand {
    /// Command byte for channel 0 in the given mode, lobyte/hibyte, binary.
    #[inline]
    pub const fn primary(mode: PitMode) -> Self {
        Self::from_bits_retain(Self::ACCESS_LOHI.bits() | mode.command_bits().bits())
    }
}

bitflags! {
    /// Bits of system control port B (0x61) owned by the tone path.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpeakerGate: u8 {
        /// Gate input of PIT channel 2.
        const TIMER2_GATE = 1 << 0;
        /// Route channel 2 output to the speaker.
        const SPEAKER_DATA = 1 << 1;

        const ENABLED = Self::TIMER2_GATE.bits() | Self::SPEAKER_DATA.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes_match_datasheet() {
        assert_eq!(PitCommand::primary(PitMode::RateGenerator).bits(), 0x34);
        assert_eq!(PitCommand::primary(PitMode::SquareWave).bits(), 0x36);
        assert_eq!(PitCommand::SECONDARY_SQUARE_WAVE.bits(), 0xB6);
    }

    #[test]
    fn min_frequency_is_the_16_bit_boundary() {
        assert!(PIT_BASE_FREQUENCY_HZ / PIT_MIN_FREQUENCY_HZ <= PIT_MAX_COUNTDOWN as u32);
        assert!(PIT_BASE_FREQUENCY_HZ / (PIT_MIN_FREQUENCY_HZ - 1) > PIT_MAX_COUNTDOWN as u32);
    }

    #[test]
    fn mode_raw_roundtrip() {
        assert_eq!(PitMode::from_raw(PitMode::SquareWave as u8), PitMode::SquareWave);
        assert_eq!(PitMode::from_raw(PitMode::RateGenerator as u8), PitMode::RateGenerator);
        assert_eq!(PitMode::from_raw(7), PitMode::RateGenerator);
    }

    #[test]
    fn speaker_gate_bits() {
        assert_eq!(SpeakerGate::ENABLED.bits(), 0x03);
    }
}
