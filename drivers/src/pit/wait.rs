use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use pitmux_abi::TimerResult;

use super::platform::PitPlatform;
use super::registry::TimerDescriptor;
use super::Pit;

const NS_PER_MS: u64 = 1_000_000;

impl<P: PitPlatform> Pit<P> {
    /// Block for at least `ms` milliseconds.
    pub fn wait(&self, ms: u64) -> TimerResult<()> {
        self.wait_nanoseconds(ms.saturating_mul(NS_PER_MS))
    }

    /// Block for at least `ns` nanoseconds by idling between ticks.
    ///
    /// Must not be called from interrupt context: the flag is only ever set
    /// by the tick dispatcher.
    pub fn wait_nanoseconds(&self, ns: u64) -> TimerResult<()> {
        let elapsed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&elapsed);
        let timer = TimerDescriptor::one_shot(ns, move |_| flag.store(true, Ordering::Release));

        let handle = self.register(&timer)?;
        while !elapsed.load(Ordering::Acquire) {
            self.platform.idle();
        }
        handle.release();
        Ok(())
    }
}
