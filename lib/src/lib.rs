#![no_std]
#![forbid(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
extern crate std;

pub mod cpu {
    use x86_64::instructions::{self, interrupts};

    /// Suspend the core until the next interrupt arrives.
    #[inline(always)]
    pub fn hlt() {
        instructions::hlt();
    }

    /// Run `f` with maskable interrupts off, restoring the previous IF state.
    #[inline]
    pub fn without_interrupts<R>(f: impl FnOnce() -> R) -> R {
        interrupts::without_interrupts(f)
    }
}

pub mod io {
    use pitmux_abi::arch::x86_64::Port;
    use x86_64::instructions::port::Port as HwPort;

    /// # Safety
    /// Writing an arbitrary port can reprogram any legacy device.
    #[inline(always)]
    pub unsafe fn outb(port: Port, value: u8) {
        let mut hw = HwPort::<u8>::new(port.number());
        unsafe { hw.write(value) }
    }

    /// # Safety
    /// Reads from some ports have side effects (FIFO pops, latch resets).
    #[inline(always)]
    pub unsafe fn inb(port: Port) -> u8 {
        let mut hw = HwPort::<u8>::new(port.number());
        unsafe { hw.read() }
    }
}

pub mod kdiag;
pub mod klog;

pub use kdiag::{InterruptFrame, kdiag_dump_interrupt_frame};
pub use klog::{
    KlogLevel, KlogSink, klog_attach_sink, klog_get_level, klog_init, klog_is_enabled,
    klog_set_level,
};
