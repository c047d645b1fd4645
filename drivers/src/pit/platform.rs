//! The PIT driver's view of the machine.
//!
//! Port I/O, the idle instruction and interrupt masking are the only things
//! the multiplexer needs from the CPU. Keeping them behind a trait lets the
//! same driver run on hardware ([`LegacyPlatform`]) and under host tests.

use pitmux_abi::arch::x86_64::Port;
use pitmux_lib::{cpu, io};

pub trait PitPlatform: Send + Sync {
    /// Write one byte to an I/O port. Fire-and-forget.
    fn outb(&self, port: Port, value: u8);

    /// Read one byte from an I/O port.
    fn inb(&self, port: Port) -> u8;

    /// Suspend until the next interrupt has been serviced.
    fn idle(&self);

    /// Run `f` with the timer interrupt unable to preempt it.
    fn without_interrupts<R>(&self, f: impl FnOnce() -> R) -> R;
}

/// Bare-metal x86 platform: real `out`/`in`, `hlt`, and `cli`/`sti`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyPlatform;

impl PitPlatform for LegacyPlatform {
    #[inline]
    fn outb(&self, port: Port, value: u8) {
        // SAFETY: the driver only addresses the PIT and system control ports.
        unsafe { io::outb(port, value) }
    }

    #[inline]
    fn inb(&self, port: Port) -> u8 {
        // SAFETY: port 0x61 reads have no side effects.
        unsafe { io::inb(port) }
    }

    #[inline]
    fn idle(&self) {
        cpu::hlt();
    }

    #[inline]
    fn without_interrupts<R>(&self, f: impl FnOnce() -> R) -> R {
        cpu::without_interrupts(f)
    }
}
