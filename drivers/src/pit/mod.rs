//! 8254 PIT driver and software timer multiplexer.
//!
//! Channel 0 fires IRQ 0; every interrupt is charged against all registered
//! [`TimerDescriptor`]s in nanoseconds, so any number of one-shot and
//! recurring timers share the single hardware countdown. Channel 2 is only
//! used for speaker tones.

use core::sync::atomic::{AtomicU8, AtomicU16, AtomicU64, Ordering};

use pitmux_abi::arch::x86_64::{PitCommand, PitMode};
use pitmux_abi::{IrqResult, TimerResult};
use pitmux_lib::{InterruptFrame, klog_debug, klog_info};
use spin::Mutex;

use crate::hw::pit_defs::{PIT_DEFAULT_FREQUENCY_HZ, PIT_IRQ_LINE, PIT_MAX_COUNTDOWN};
use crate::irq::{self, IrqContext};

mod countdown;
mod dispatch;
mod handle;
mod platform;
mod registry;
mod system;
mod tone;
mod wait;


pub use countdown::{
    Channel, countdown_for_delay, countdown_for_frequency, delay_for_countdown,
    effective_ticks, frequency_for_countdown,
};
pub use handle::TimerHandle;
pub use platform::{LegacyPlatform, PitPlatform};
pub use registry::{TIMER_ID_UNSET, TimerCallback, TimerDescriptor};
pub use system::{
    pit_get_frequency, pit_init, pit_mute_tone, pit_play_tone, pit_wait_ms, system_pit,
};

use registry::TimerRegistry;

/// Generates `<prefix>_{countdown,frequency,delay_ns}` getters and
/// `set_<prefix>_*` setters for a channel.
macro_rules! channel_accessors {
    ($($prefix:ident => $channel:expr),* $(,)?) => {
        paste::paste! {
            $(
                #[inline]
                pub fn [<$prefix _countdown>](&self) -> u16 {
                    self.countdown($channel)
                }

                #[inline]
                pub fn [<set_ $prefix _countdown>](&self, countdown: u16) {
                    self.set_countdown($channel, countdown);
                }

                #[inline]
                pub fn [<$prefix _frequency>](&self) -> u32 {
                    frequency_for_countdown(self.countdown($channel))
                }

                pub fn [<set_ $prefix _frequency>](&self, frequency_hz: u32) -> TimerResult<()> {
                    let countdown = countdown_for_frequency(frequency_hz)?;
                    self.set_countdown($channel, countdown);
                    Ok(())
                }

                #[inline]
                pub fn [<$prefix _delay_ns>](&self) -> u64 {
                    delay_for_countdown(self.countdown($channel))
                }

                pub fn [<set_ $prefix _delay_ns>](&self, delay_ns: u64) -> TimerResult<()> {
                    let countdown = countdown_for_delay(delay_ns)?;
                    self.set_countdown($channel, countdown);
                    Ok(())
                }
            )*
        }
    };
}

pub struct Pit<P: PitPlatform> {
    platform: P,
    registry: Mutex<TimerRegistry>,
    /// Write-only registers, so the last programmed value is mirrored here.
    countdowns: [AtomicU16; 2],
    primary_mode: AtomicU8,
    ticks: AtomicU64,
    elapsed_ns: AtomicU64,
}

impl<P: PitPlatform> Pit<P> {
    /// Build a driver instance. Hardware is untouched until [`Pit::init`] or a
    /// channel setter runs.
    pub const fn new(platform: P) -> Self {
        Self {
            platform,
            registry: Mutex::new(TimerRegistry::new()),
            countdowns: [AtomicU16::new(0), AtomicU16::new(0)],
            primary_mode: AtomicU8::new(PitMode::RateGenerator as u8),
            ticks: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
        }
    }

    /// Program the tick frequency; 0 selects [`PIT_DEFAULT_FREQUENCY_HZ`].
    pub fn init(&self, frequency_hz: u32) -> TimerResult<()> {
        let frequency_hz = if frequency_hz == 0 {
            PIT_DEFAULT_FREQUENCY_HZ
        } else {
            frequency_hz
        };
        klog_info!("PIT: Initializing timer at {} Hz", frequency_hz);
        self.set_t0_frequency(frequency_hz)
    }

    #[inline]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    channel_accessors!(t0 => Channel::Primary, t2 => Channel::Secondary);

    /// Last countdown loaded into `channel`.
    #[inline]
    pub fn countdown(&self, channel: Channel) -> u16 {
        self.countdowns[channel.index()].load(Ordering::Acquire)
    }

    pub fn set_countdown(&self, channel: Channel, countdown: u16) {
        self.platform
            .without_interrupts(|| self.program(channel, countdown));
        klog_debug!(
            "PIT: {:?} countdown {} ({} Hz)",
            channel,
            countdown,
            frequency_for_countdown(countdown)
        );
    }

    #[inline]
    pub fn primary_mode(&self) -> PitMode {
        PitMode::from_raw(self.primary_mode.load(Ordering::Relaxed))
    }

    /// Switch the tick channel's generator mode, reloading the current countdown.
    pub fn set_primary_mode(&self, mode: PitMode) {
        self.platform.without_interrupts(|| {
            self.primary_mode.store(mode as u8, Ordering::Relaxed);
            self.program(Channel::Primary, self.countdown(Channel::Primary));
        });
    }

    /// Load `countdown` into `channel` and mirror it. Callers provide the
    /// critical section: IRQ context already has one, normal context wraps
    /// this in `without_interrupts`.
    fn program(&self, channel: Channel, countdown: u16) {
        let command = match channel {
            Channel::Primary => PitCommand::primary(self.primary_mode()),
            Channel::Secondary => PitCommand::SECONDARY_SQUARE_WAVE,
        };
        countdown::write_countdown(&self.platform, channel, command, countdown);
        self.countdowns[channel.index()].store(countdown, Ordering::Release);
    }

    /// Register `descriptor` and return its new id.
    ///
    /// The tick channel is reloaded with its longest span so the new timer
    /// starts being charged from the next interrupt.
    pub fn register_timer(&self, descriptor: &TimerDescriptor) -> TimerResult<i64> {
        let id = self.platform.without_interrupts(|| -> TimerResult<i64> {
            let id = self.registry.lock().insert(descriptor)?;
            self.program(Channel::Primary, PIT_MAX_COUNTDOWN);
            Ok(id)
        })?;
        klog_debug!(
            "PIT: Registered timer {} ({} ns, {})",
            id,
            descriptor.period_ns(),
            if descriptor.is_recurring() { "recurring" } else { "one-shot" }
        );
        Ok(id)
    }

    /// Register `descriptor` and return a handle that unregisters on release.
    pub fn register(&self, descriptor: &TimerDescriptor) -> TimerResult<TimerHandle<'_, P>> {
        let id = self.register_timer(descriptor)?;
        Ok(TimerHandle::new(self, descriptor.clone(), id))
    }

    /// Remove the timer with `id`. Unknown or already-removed ids are ignored.
    pub fn unregister_timer(&self, id: i64) {
        let removed = self
            .platform
            .without_interrupts(|| self.registry.lock().remove(id));
        if removed {
            klog_debug!("PIT: Unregistered timer {}", id);
        }
    }

    pub fn is_registered(&self, id: i64) -> bool {
        self.platform
            .without_interrupts(|| self.registry.lock().contains(id))
    }

    pub fn timer_count(&self) -> usize {
        self.platform
            .without_interrupts(|| self.registry.lock().len())
    }

    /// Interrupts dispatched so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Sum of the tick periods charged to timers, in nanoseconds.
    #[inline]
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns.load(Ordering::Relaxed)
    }

    /// Bind [`Pit::dispatch`] to legacy IRQ 0.
    pub fn attach(&'static self) -> IrqResult<()>
    where
        P: 'static,
    {
        irq::register_handler(
            PIT_IRQ_LINE,
            Self::irq_entry,
            IrqContext::new(self as *const Self),
            "pit",
        )
    }

    /// Unbind from IRQ 0 if this instance owns the line. Returns whether it
    /// did.
    pub fn detach(&self) -> bool {
        irq::release_handler(PIT_IRQ_LINE, IrqContext::new(self as *const Self))
    }

    fn irq_entry(_irq: u8, frame: &mut InterruptFrame, context: IrqContext) {
        // SAFETY: `attach` stored a pointer to a `'static` instance of this type.
        let pit = unsafe { &*context.as_ptr::<Self>() };
        pit.dispatch(frame);
    }
}
