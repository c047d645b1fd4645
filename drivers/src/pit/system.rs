//! The boot-time PIT instance and its C-ABI surface.

use core::ffi::c_int;

use pitmux_abi::{TimerError, TimerResult};
use pitmux_lib::{klog_error, klog_info};
use spin::Once;

use super::Pit;
use super::platform::{LegacyPlatform, PitPlatform};
use crate::hw::pit_defs::{PIT_DEFAULT_FREQUENCY_HZ, PIT_IRQ_LINE};

static LEGACY_PIT: Pit<LegacyPlatform> = Pit::new(LegacyPlatform);

/// Set only after channel 0 is programmed and IRQ 0 is bound.
static SYSTEM_PIT: Once<&'static Pit<LegacyPlatform>> = Once::new();

/// Bring up the machine's PIT: program channel 0 at `frequency_hz` (0 means
/// the default) and bind the dispatcher to IRQ 0. A failed call publishes
/// nothing and may be retried; once it succeeds, later calls return the
/// running instance untouched.
pub fn pit_init(frequency_hz: u32) -> TimerResult<&'static Pit<LegacyPlatform>> {
    bring_up(&SYSTEM_PIT, &LEGACY_PIT, frequency_hz)
}

pub(super) fn bring_up<P: PitPlatform + 'static>(
    slot: &Once<&'static Pit<P>>,
    pit: &'static Pit<P>,
    frequency_hz: u32,
) -> TimerResult<&'static Pit<P>> {
    slot.try_call_once(|| {
        pit.init(frequency_hz)?;
        pit.attach().map_err(|err| {
            klog_error!("PIT: Failed to claim IRQ {}: {:?}", PIT_IRQ_LINE, err);
            TimerError::from(err)
        })?;
        klog_info!("PIT: Dispatcher attached to IRQ {}", PIT_IRQ_LINE);
        Ok(pit)
    })
    .copied()
}

#[inline]
pub fn system_pit() -> Option<&'static Pit<LegacyPlatform>> {
    SYSTEM_PIT.get().copied()
}

#[unsafe(no_mangle)]
pub extern "C" fn pit_get_frequency() -> u32 {
    system_pit()
        .map(|pit| pit.t0_frequency())
        .unwrap_or(PIT_DEFAULT_FREQUENCY_HZ)
}

#[unsafe(no_mangle)]
pub extern "C" fn pit_wait_ms(ms: u32) -> c_int {
    let Some(pit) = system_pit() else {
        return TimerError::NotInitialized.as_c_int();
    };
    TimerError::c_result(pit.wait(ms as u64))
}

#[unsafe(no_mangle)]
pub extern "C" fn pit_play_tone(frequency_hz: u32) -> c_int {
    let Some(pit) = system_pit() else {
        return TimerError::NotInitialized.as_c_int();
    };
    TimerError::c_result(pit.play_tone(frequency_hz))
}

#[unsafe(no_mangle)]
pub extern "C" fn pit_mute_tone() {
    if let Some(pit) = system_pit() {
        pit.mute_tone();
    }
}
