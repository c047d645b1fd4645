#![no_std]
#![forbid(unsafe_op_in_unsafe_fn)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod hw;
pub mod irq;
pub mod pit;

pub use pit::{LegacyPlatform, Pit, PitPlatform, TimerDescriptor, TimerHandle};
