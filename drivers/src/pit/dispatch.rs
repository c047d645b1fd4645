use core::sync::atomic::Ordering;

use pitmux_lib::{InterruptFrame, klog_debug};

use super::countdown::{Channel, delay_for_countdown};
use super::platform::PitPlatform;
use super::Pit;
use crate::hw::pit_defs::{PIT_LOGGED_TICKS, PIT_MAX_COUNTDOWN};

impl<P: PitPlatform> Pit<P> {
    /// Tick handler, run once per IRQ 0 in interrupt context.
    ///
    /// The period that just elapsed is whatever countdown was loaded. Each
    /// timer is charged that much, newest first; due timers are re-armed or
    /// dropped before their callback runs, and callbacks run without the
    /// registry lock held so they may register or unregister timers.
    /// Timers registered by a callback are first charged on the next tick.
    pub fn dispatch(&self, frame: &mut InterruptFrame) {
        let tick_delay_ns = delay_for_countdown(self.countdown(Channel::Primary));
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        self.elapsed_ns.fetch_add(tick_delay_ns, Ordering::Relaxed);
        if tick <= PIT_LOGGED_TICKS {
            klog_debug!("PIT: Timer tick #{} ({} ns)", tick, tick_delay_ns);
        }

        let slot_count = {
            let mut registry = self.registry.lock();
            if registry.is_empty() {
                return;
            }
            registry.compact();
            registry.slot_count()
        };

        self.program(Channel::Primary, PIT_MAX_COUNTDOWN);

        for index in (0..slot_count).rev() {
            let due = self.registry.lock().advance(index, tick_delay_ns);
            if let Some(timer) = due {
                (timer.callback)(&mut *frame);
            }
        }
    }
}
