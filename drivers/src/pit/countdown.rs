//! Countdown arithmetic and the three-write programming sequence.
//!
//! `countdown = PIT_BASE_FREQUENCY_HZ / frequency` and
//! `delay_ns = PIT_TICK_NS * countdown`. A loaded countdown of 0 is the
//! chip's 65536-tick span, never "immediate".

use pitmux_abi::arch::x86_64::{PitCommand, Port};
use pitmux_abi::{TimerError, TimerResult};

use super::platform::PitPlatform;
use crate::hw::pit_defs::{
    PIT_BASE_FREQUENCY_HZ, PIT_MAX_DELAY_NS, PIT_MIN_FREQUENCY_HZ, PIT_TICK_NS,
    PIT_ZERO_COUNTDOWN_TICKS,
};

/// The two channels the driver programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Channel 0: drives IRQ 0 and the tick dispatcher.
    Primary,
    /// Channel 2: tone generation only.
    Secondary,
}

impl Channel {
    #[inline]
    pub const fn data_port(self) -> Port {
        match self {
            Self::Primary => Port::PIT_CHANNEL0,
            Self::Secondary => Port::PIT_CHANNEL2,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

/// Oscillator ticks a loaded countdown actually spans.
#[inline]
pub const fn effective_ticks(countdown: u16) -> u32 {
    if countdown == 0 {
        PIT_ZERO_COUNTDOWN_TICKS
    } else {
        countdown as u32
    }
}

pub fn countdown_for_frequency(frequency_hz: u32) -> TimerResult<u16> {
    if !(PIT_MIN_FREQUENCY_HZ..=PIT_BASE_FREQUENCY_HZ).contains(&frequency_hz) {
        return Err(TimerError::InvalidArgument);
    }
    u16::try_from(PIT_BASE_FREQUENCY_HZ / frequency_hz).map_err(|_| TimerError::InvalidArgument)
}

#[inline]
pub const fn frequency_for_countdown(countdown: u16) -> u32 {
    PIT_BASE_FREQUENCY_HZ / effective_ticks(countdown)
}

/// Delays shorter than one oscillator tick round up to a countdown of 1.
pub fn countdown_for_delay(delay_ns: u64) -> TimerResult<u16> {
    if delay_ns > PIT_MAX_DELAY_NS {
        return Err(TimerError::InvalidArgument);
    }
    let countdown = (delay_ns / PIT_TICK_NS).max(1);
    u16::try_from(countdown).map_err(|_| TimerError::InvalidArgument)
}

#[inline]
pub const fn delay_for_countdown(countdown: u16) -> u64 {
    PIT_TICK_NS * effective_ticks(countdown) as u64
}

/// Mode byte, then low byte, then high byte.
pub(crate) fn write_countdown<P: PitPlatform>(
    platform: &P,
    channel: Channel,
    command: PitCommand,
    countdown: u16,
) {
    let [low, high] = countdown.to_le_bytes();
    platform.outb(Port::PIT_COMMAND, command.bits());
    platform.outb(channel.data_port(), low);
    platform.outb(channel.data_port(), high);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::pit_defs::PIT_MAX_COUNTDOWN;

    #[test]
    fn thousand_hertz_is_exact() {
        let countdown = countdown_for_frequency(1000).unwrap();
        assert_eq!(countdown, 1193);
        assert_eq!(frequency_for_countdown(countdown), 1000);
    }

    #[test]
    fn frequency_bounds() {
        assert_eq!(countdown_for_frequency(10), Err(TimerError::InvalidArgument));
        assert_eq!(countdown_for_frequency(18), Err(TimerError::InvalidArgument));
        assert_eq!(countdown_for_frequency(0), Err(TimerError::InvalidArgument));
        assert_eq!(
            countdown_for_frequency(PIT_BASE_FREQUENCY_HZ + 1),
            Err(TimerError::InvalidArgument)
        );
        assert_eq!(countdown_for_frequency(19), Ok(62_798));
        assert_eq!(countdown_for_frequency(PIT_BASE_FREQUENCY_HZ), Ok(1));
    }

    #[test]
    fn frequency_readback_follows_integer_rounding() {
        for frequency in [19, 20, 100, 440, 1000, 4_321, 65_536, 600_000, PIT_BASE_FREQUENCY_HZ] {
            let countdown = countdown_for_frequency(frequency).unwrap();
            let readback = frequency_for_countdown(countdown);
            assert_eq!(readback, PIT_BASE_FREQUENCY_HZ / countdown as u32);
            assert!(readback >= frequency, "{frequency} Hz read back as {readback}");
        }
    }

    #[test]
    fn zero_countdown_is_the_full_span() {
        assert_eq!(effective_ticks(0), 65_536);
        assert_eq!(delay_for_countdown(0), PIT_TICK_NS * 65_536);
        assert_eq!(frequency_for_countdown(0), 18);
    }

    #[test]
    fn delay_bounds() {
        assert_eq!(countdown_for_delay(PIT_MAX_DELAY_NS), Ok(PIT_MAX_COUNTDOWN));
        assert_eq!(
            countdown_for_delay(PIT_MAX_DELAY_NS + 1),
            Err(TimerError::InvalidArgument)
        );
        assert_eq!(countdown_for_delay(0), Ok(1));
        assert_eq!(countdown_for_delay(1_000_000), Ok(1193));
        assert_eq!(delay_for_countdown(1193), 999_734);
    }
}
