//! Legacy IRQ line table.
//!
//! Maps each of the 16 legacy lines to one handler plus an opaque context
//! pointer. The low-level entry stub calls [`irq_dispatch`] with the frame it
//! pushed; acknowledging the controller happens in that stub.

use core::sync::atomic::{AtomicBool, Ordering};

use pitmux_abi::{IrqError, IrqResult};
use pitmux_lib::{InterruptFrame, kdiag_dump_interrupt_frame, klog_debug, klog_info};
use spin::Mutex;

use crate::hw::irq_defs::{IRQ_BASE_VECTOR, IRQ_LINES};

/// Opaque pointer handed back to a handler on every dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IrqContext(*const ());

// SAFETY: the table only stores the pointer; handlers that registered it are
// responsible for the pointee outliving the registration.
unsafe impl Send for IrqContext {}

impl IrqContext {
    pub const NONE: Self = Self(core::ptr::null());

    #[inline]
    pub const fn new<T>(ptr: *const T) -> Self {
        Self(ptr as *const ())
    }

    #[inline]
    pub const fn as_ptr<T>(self) -> *const T {
        self.0 as *const T
    }
}

pub type IrqHandler = fn(u8, &mut InterruptFrame, IrqContext);

#[derive(Clone, Copy)]
struct IrqEntry {
    handler: Option<IrqHandler>,
    context: IrqContext,
    name: &'static str,
    count: u64,
    reported_unhandled: bool,
}

impl IrqEntry {
    const fn new() -> Self {
        Self {
            handler: None,
            context: IrqContext::NONE,
            name: "",
            count: 0,
            reported_unhandled: false,
        }
    }
}

/// Per-line dispatch statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IrqStats {
    pub count: u64,
}

static IRQ_TABLE: Mutex<[IrqEntry; IRQ_LINES]> = Mutex::new([IrqEntry::new(); IRQ_LINES]);
static UNHANDLED_SPURIOUS: AtomicBool = AtomicBool::new(false);

/// Every table access runs with interrupts masked, so IRQ 0 cannot land on
/// this core while the lock is held.
fn with_irq_table<R>(f: impl FnOnce(&mut [IrqEntry; IRQ_LINES]) -> R) -> R {
    irq_save(|| {
        let mut table = IRQ_TABLE.lock();
        f(&mut *table)
    })
}

#[cfg(not(test))]
#[inline]
fn irq_save<R>(f: impl FnOnce() -> R) -> R {
    pitmux_lib::cpu::without_interrupts(f)
}

// `cli` faults in user mode; host tests only count the masked sections.
#[cfg(test)]
static MASKED_SECTIONS: core::sync::atomic::AtomicUsize = core::sync::atomic::AtomicUsize::new(0);

#[cfg(test)]
fn irq_save<R>(f: impl FnOnce() -> R) -> R {
    MASKED_SECTIONS.fetch_add(1, Ordering::SeqCst);
    f()
}

#[inline]
fn line_index(irq: u8) -> IrqResult<usize> {
    let index = irq as usize;
    if index >= IRQ_LINES {
        return Err(IrqError::InvalidLine);
    }
    Ok(index)
}

pub fn register_handler(
    irq: u8,
    handler: IrqHandler,
    context: IrqContext,
    name: &'static str,
) -> IrqResult<()> {
    let index = line_index(irq)?;
    with_irq_table(|table| {
        let entry = &mut table[index];
        if entry.handler.is_some() {
            return Err(IrqError::LineBusy);
        }
        entry.handler = Some(handler);
        entry.context = context;
        entry.name = name;
        entry.reported_unhandled = false;
        Ok(())
    })?;
    klog_debug!("IRQ: Registered handler for line {} ({})", irq, name);
    Ok(())
}

/// Clear `irq` if it is still bound to `context`. Returns whether the line
/// was released; a caller that never owned the line leaves it untouched.
pub fn release_handler(irq: u8, context: IrqContext) -> bool {
    let Ok(index) = line_index(irq) else {
        return false;
    };
    let released = with_irq_table(|table| {
        let entry = &mut table[index];
        if entry.handler.is_none() || entry.context != context {
            return false;
        }
        *entry = IrqEntry::new();
        true
    });
    if released {
        klog_debug!("IRQ: Released handler for line {}", irq);
    }
    released
}

pub fn is_registered(irq: u8) -> bool {
    line_index(irq)
        .map(|index| with_irq_table(|table| table[index].handler.is_some()))
        .unwrap_or(false)
}

pub fn stats(irq: u8) -> Option<IrqStats> {
    let index = line_index(irq).ok()?;
    let count = with_irq_table(|table| table[index].count);
    Some(IrqStats { count })
}

fn log_unhandled_irq(irq: u8, vector: u8) {
    let already_reported = with_irq_table(|table| {
        core::mem::replace(&mut table[irq as usize].reported_unhandled, true)
    });
    if !already_reported {
        klog_info!("IRQ: Unhandled IRQ {} (vector {})", irq, vector);
    }
}

/// Route a hardware interrupt frame to its line handler.
pub fn irq_dispatch(frame: &mut InterruptFrame) {
    let vector = (frame.vector & 0xFF) as u8;
    if vector < IRQ_BASE_VECTOR {
        klog_info!("IRQ: Received non-IRQ vector {}", vector);
        return;
    }

    let irq = vector - IRQ_BASE_VECTOR;
    if irq as usize >= IRQ_LINES {
        if !UNHANDLED_SPURIOUS.swap(true, Ordering::Relaxed) {
            klog_info!("IRQ: Spurious vector {} received", vector);
        }
        return;
    }

    let snapshot = with_irq_table(|table| {
        let entry = &mut table[irq as usize];
        entry.count = entry.count.wrapping_add(1);
        entry.handler.map(|handler| (handler, entry.context))
    });

    let Some((handler, context)) = snapshot else {
        log_unhandled_irq(irq, vector);
        return;
    };

    let expected_cs = frame.cs;
    let expected_rip = frame.rip;

    handler(irq, frame, context);

    if frame.cs != expected_cs || frame.rip != expected_rip {
        kdiag_dump_interrupt_frame(frame);
        panic!("IRQ: frame corrupted by handler for IRQ {}", irq);
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    // Tests share the global table, so each one claims its own line.

    static SEEN: AtomicU32 = AtomicU32::new(0);

    fn counting_handler(irq: u8, _frame: &mut InterruptFrame, context: IrqContext) {
        let bump = unsafe { *context.as_ptr::<u32>() };
        SEEN.fetch_add(bump + irq as u32, Ordering::SeqCst);
    }

    #[test]
    fn dispatch_reaches_registered_handler() {
        static BUMP: u32 = 100;
        register_handler(5, counting_handler, IrqContext::new(&BUMP as *const u32), "test").unwrap();
        let mut frame = InterruptFrame::for_vector(IRQ_BASE_VECTOR + 5);
        irq_dispatch(&mut frame);
        assert_eq!(SEEN.load(Ordering::SeqCst), 105);
        assert_eq!(stats(5), Some(IrqStats { count: 1 }));
        assert!(release_handler(5, IrqContext::new(&BUMP as *const u32)));
        assert!(!is_registered(5));
    }

    #[test]
    fn line_cannot_be_claimed_twice() {
        fn noop(_: u8, _: &mut InterruptFrame, _: IrqContext) {}
        register_handler(6, noop, IrqContext::NONE, "first").unwrap();
        assert_eq!(
            register_handler(6, noop, IrqContext::NONE, "second"),
            Err(IrqError::LineBusy)
        );
        assert!(release_handler(6, IrqContext::NONE));
        assert_eq!(register_handler(6, noop, IrqContext::NONE, "again"), Ok(()));
        assert!(release_handler(6, IrqContext::NONE));
    }

    #[test]
    fn only_the_owner_can_release_a_line() {
        fn noop(_: u8, _: &mut InterruptFrame, _: IrqContext) {}
        static OWNER: u8 = 0;
        static OTHER: u8 = 0;
        let owner = IrqContext::new(&OWNER as *const u8);
        register_handler(7, noop, owner, "owner").unwrap();

        assert!(!release_handler(7, IrqContext::new(&OTHER as *const u8)));
        assert!(!release_handler(7, IrqContext::NONE));
        assert!(is_registered(7));

        assert!(release_handler(7, owner));
        assert!(!release_handler(7, owner));
        assert!(!release_handler(IRQ_LINES as u8, owner));
    }

    #[test]
    fn table_access_masks_interrupts() {
        let before = MASKED_SECTIONS.load(Ordering::SeqCst);
        let _ = stats(8);
        let after_stats = MASKED_SECTIONS.load(Ordering::SeqCst);
        assert!(after_stats > before);

        let _ = is_registered(8);
        assert!(MASKED_SECTIONS.load(Ordering::SeqCst) > after_stats);
    }

    #[test]
    fn out_of_range_lines_are_rejected() {
        fn noop(_: u8, _: &mut InterruptFrame, _: IrqContext) {}
        assert_eq!(
            register_handler(IRQ_LINES as u8, noop, IrqContext::NONE, "bad"),
            Err(IrqError::InvalidLine)
        );
        assert_eq!(stats(200), None);
    }

    #[test]
    fn unhandled_lines_are_counted_not_fatal() {
        let mut frame = InterruptFrame::for_vector(IRQ_BASE_VECTOR + 9);
        irq_dispatch(&mut frame);
        irq_dispatch(&mut frame);
        assert_eq!(stats(9).map(|s| s.count), Some(2));

        let mut exception = InterruptFrame::for_vector(14);
        irq_dispatch(&mut exception);
    }
}
