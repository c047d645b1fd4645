use core::fmt;

use super::platform::PitPlatform;
use super::registry::TimerDescriptor;
use super::Pit;

/// Scoped registration of a [`TimerDescriptor`].
///
/// The handle borrows the driver that owns the registry. [`release`] (or
/// dropping the handle) unregisters the timer if it is still live; both are
/// no-ops for a one-shot timer that already fired.
///
/// The handle is tied to the id its own registration produced. If the timer
/// is unregistered elsewhere and the descriptor registered again through
/// [`Pit::register_timer`], the newer registration is not the handle's to
/// release and survives it.
///
/// [`release`]: TimerHandle::release
#[must_use = "dropping the handle unregisters the timer"]
pub struct TimerHandle<'p, P: PitPlatform> {
    pit: &'p Pit<P>,
    descriptor: TimerDescriptor,
    id: i64,
}

impl<'p, P: PitPlatform> TimerHandle<'p, P> {
    pub(super) fn new(pit: &'p Pit<P>, descriptor: TimerDescriptor, id: i64) -> Self {
        Self {
            pit,
            descriptor,
            id,
        }
    }

    /// Id assigned when this handle was created.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether the registration this handle made is still live.
    #[inline]
    pub fn is_registered(&self) -> bool {
        self.descriptor.id() == self.id
    }

    #[inline]
    pub fn descriptor(&self) -> &TimerDescriptor {
        &self.descriptor
    }

    /// Unregister now. Equivalent to dropping the handle.
    pub fn release(self) {
        drop(self);
    }

    fn release_inner(&self) {
        if self.is_registered() {
            self.pit.unregister_timer(self.id);
        }
    }
}

impl<P: PitPlatform> Drop for TimerHandle<'_, P> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl<P: PitPlatform> fmt::Debug for TimerHandle<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}
