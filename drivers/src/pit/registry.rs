//! Logical timer descriptors and the slot arena that holds the live ones.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicI64, Ordering};

use pitmux_abi::{TimerError, TimerResult};
use pitmux_lib::InterruptFrame;

/// Id carried by a descriptor that is not in a registry.
pub const TIMER_ID_UNSET: i64 = -1;

/// Action run from the tick interrupt when a timer comes due.
pub type TimerCallback = Box<dyn Fn(&mut InterruptFrame) + Send + Sync>;

pub(crate) struct TimerState {
    id: AtomicI64,
    period_ns: u64,
    remaining_ns: AtomicI64,
    recurring: bool,
    pub(crate) callback: TimerCallback,
}

impl TimerState {
    #[inline]
    fn period_as_remaining(&self) -> i64 {
        i64::try_from(self.period_ns).unwrap_or(i64::MAX)
    }
}

/// A software timer owned by its creator and shared with the registry while
/// registered.
///
/// Cloning yields another reference to the same timer, so registering a clone
/// of a live descriptor is rejected just like registering the original.
#[derive(Clone)]
pub struct TimerDescriptor {
    state: Arc<TimerState>,
}

impl TimerDescriptor {
    pub fn new(
        period_ns: u64,
        recurring: bool,
        callback: impl Fn(&mut InterruptFrame) + Send + Sync + 'static,
    ) -> Self {
        let state = TimerState {
            id: AtomicI64::new(TIMER_ID_UNSET),
            period_ns,
            remaining_ns: AtomicI64::new(0),
            recurring,
            callback: Box::new(callback),
        };
        state
            .remaining_ns
            .store(state.period_as_remaining(), Ordering::Relaxed);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn one_shot(
        period_ns: u64,
        callback: impl Fn(&mut InterruptFrame) + Send + Sync + 'static,
    ) -> Self {
        Self::new(period_ns, false, callback)
    }

    pub fn recurring(
        period_ns: u64,
        callback: impl Fn(&mut InterruptFrame) + Send + Sync + 'static,
    ) -> Self {
        Self::new(period_ns, true, callback)
    }

    /// Registry id, or [`TIMER_ID_UNSET`].
    #[inline]
    pub fn id(&self) -> i64 {
        self.state.id.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.id() != TIMER_ID_UNSET
    }

    #[inline]
    pub fn period_ns(&self) -> u64 {
        self.state.period_ns
    }

    #[inline]
    pub fn remaining_ns(&self) -> i64 {
        self.state.remaining_ns.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_recurring(&self) -> bool {
        self.state.recurring
    }
}

impl fmt::Debug for TimerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerDescriptor")
            .field("id", &self.id())
            .field("period_ns", &self.period_ns())
            .field("remaining_ns", &self.remaining_ns())
            .field("recurring", &self.is_recurring())
            .finish_non_exhaustive()
    }
}

/// Insertion-ordered arena of live timers.
///
/// Removal empties a slot in place so indices stay stable while the
/// dispatcher walks them; holes are squeezed out by [`compact`] at the start
/// of each tick.
///
/// [`compact`]: TimerRegistry::compact
pub(crate) struct TimerRegistry {
    slots: Vec<Option<Arc<TimerState>>>,
    live: usize,
    last_id: i64,
}

impl TimerRegistry {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            last_id: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn contains(&self, id: i64) -> bool {
        id != TIMER_ID_UNSET && self.position(id).is_some()
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|timer| timer.id.load(Ordering::Relaxed) == id)
        })
    }

    /// Assign the next id and append. The countdown restarts from the period.
    pub(crate) fn insert(&mut self, descriptor: &TimerDescriptor) -> TimerResult<i64> {
        let state = &descriptor.state;
        if state.id.load(Ordering::Acquire) != TIMER_ID_UNSET {
            return Err(TimerError::AlreadyRegistered);
        }
        let id = self
            .last_id
            .checked_add(1)
            .ok_or(TimerError::IdsExhausted)?;
        self.last_id = id;

        state
            .remaining_ns
            .store(state.period_as_remaining(), Ordering::Relaxed);
        state.id.store(id, Ordering::Release);
        self.slots.push(Some(Arc::clone(state)));
        self.live += 1;
        Ok(id)
    }

    /// Returns whether a live timer was removed.
    pub(crate) fn remove(&mut self, id: i64) -> bool {
        if id == TIMER_ID_UNSET {
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };
        if let Some(timer) = self.slots[index].take() {
            timer.id.store(TIMER_ID_UNSET, Ordering::Release);
            self.live -= 1;
        }
        true
    }

    pub(crate) fn compact(&mut self) {
        if self.slots.len() != self.live {
            self.slots.retain(Option::is_some);
        }
    }

    /// Charge one tick to the timer in `index`.
    ///
    /// Returns the timer when it came due: recurring timers are re-armed to
    /// their full period, one-shot timers are unset and their slot emptied.
    pub(crate) fn advance(&mut self, index: usize, tick_delay_ns: u64) -> Option<Arc<TimerState>> {
        let slot = self.slots.get_mut(index)?;
        let timer = slot.as_ref()?;

        let delay = i64::try_from(tick_delay_ns).unwrap_or(i64::MAX);
        let remaining = timer
            .remaining_ns
            .load(Ordering::Relaxed)
            .saturating_sub(delay);
        if remaining >= 1 {
            timer.remaining_ns.store(remaining, Ordering::Relaxed);
            return None;
        }

        if timer.recurring {
            timer
                .remaining_ns
                .store(timer.period_as_remaining(), Ordering::Relaxed);
            return Some(Arc::clone(timer));
        }

        timer.remaining_ns.store(remaining, Ordering::Relaxed);
        timer.id.store(TIMER_ID_UNSET, Ordering::Release);
        self.live -= 1;
        slot.take()
    }

    #[cfg(test)]
    pub(crate) fn set_last_id(&mut self, last_id: i64) {
        self.last_id = last_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TimerDescriptor {
        TimerDescriptor::one_shot(1_000, |_| {})
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut registry = TimerRegistry::new();
        let a = noop();
        let b = noop();
        assert_eq!(registry.insert(&a), Ok(1));
        assert_eq!(registry.insert(&b), Ok(2));
        assert!(registry.remove(1));
        assert_eq!(a.id(), TIMER_ID_UNSET);
        assert_eq!(registry.insert(&a), Ok(3));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn double_insert_is_rejected() {
        let mut registry = TimerRegistry::new();
        let timer = noop();
        registry.insert(&timer).unwrap();
        assert_eq!(registry.insert(&timer), Err(TimerError::AlreadyRegistered));
        assert_eq!(registry.insert(&timer.clone()), Err(TimerError::AlreadyRegistered));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_unknown_is_a_noop() {
        let mut registry = TimerRegistry::new();
        assert!(!registry.remove(42));
        assert!(!registry.remove(TIMER_ID_UNSET));
        registry.insert(&noop()).unwrap();
        assert!(!registry.remove(7));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_keeps_indices_stable_until_compaction() {
        let mut registry = TimerRegistry::new();
        let timers = [noop(), noop(), noop()];
        for timer in &timers {
            registry.insert(timer).unwrap();
        }
        registry.remove(timers[1].id());
        assert_eq!(registry.slot_count(), 3);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(timers[2].id()));

        registry.compact();
        assert_eq!(registry.slot_count(), 2);
        assert!(registry.contains(timers[0].id()));
        assert!(registry.contains(timers[2].id()));
    }

    #[test]
    fn advance_rearms_recurring_and_drops_one_shot() {
        let mut registry = TimerRegistry::new();
        let once = TimerDescriptor::one_shot(500, |_| {});
        let every = TimerDescriptor::recurring(500, |_| {});
        registry.insert(&once).unwrap();
        registry.insert(&every).unwrap();

        assert!(registry.advance(1, 200).is_none());
        assert_eq!(every.remaining_ns(), 300);
        assert!(registry.advance(1, 300).is_some());
        assert_eq!(every.remaining_ns(), 500);
        assert!(every.is_registered());

        assert!(registry.advance(0, 600).is_some());
        assert!(!once.is_registered());
        assert_eq!(once.remaining_ns(), -100);
        assert!(registry.advance(0, 600).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reinsert_restarts_the_countdown() {
        let mut registry = TimerRegistry::new();
        let timer = TimerDescriptor::one_shot(1_000, |_| {});
        registry.insert(&timer).unwrap();
        registry.advance(0, 5_000);
        assert!(timer.remaining_ns() < 1);
        registry.insert(&timer).unwrap();
        assert_eq!(timer.remaining_ns(), 1_000);
    }

    #[test]
    fn id_counter_exhaustion_is_reported() {
        let mut registry = TimerRegistry::new();
        registry.set_last_id(i64::MAX);
        let timer = noop();
        assert_eq!(registry.insert(&timer), Err(TimerError::IdsExhausted));
        assert!(!timer.is_registered());
        assert!(registry.is_empty());
    }
}
