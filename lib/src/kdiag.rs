use crate::klog_error;

/// Register snapshot pushed by the common interrupt entry stub.
///
/// Timer callbacks receive this mutably; rewriting `rip`/`cs` from a callback
/// is treated as frame corruption by the IRQ layer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptFrame {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rbp: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
    pub vector: u64,
    pub error_code: u64,
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

impl InterruptFrame {
    /// Frame as delivered for a hardware IRQ routed at `vector`.
    pub const fn for_vector(vector: u8) -> Self {
        Self {
            r15: 0,
            r14: 0,
            r13: 0,
            r12: 0,
            r11: 0,
            r10: 0,
            r9: 0,
            r8: 0,
            rbp: 0,
            rdi: 0,
            rsi: 0,
            rdx: 0,
            rcx: 0,
            rbx: 0,
            rax: 0,
            vector: vector as u64,
            error_code: 0,
            rip: 0,
            cs: 0,
            rflags: 0,
            rsp: 0,
            ss: 0,
        }
    }
}

pub fn kdiag_dump_interrupt_frame(frame: &InterruptFrame) {
    let f = frame;
    klog_error!("=== INTERRUPT FRAME DUMP ===");
    klog_error!("Vector: {} Error Code: {:#x}", f.vector, f.error_code);
    klog_error!("RIP: {:#x}  CS: {:#x}  RFLAGS: {:#x}", f.rip, f.cs, f.rflags);
    klog_error!("RSP: {:#x}  SS: {:#x}", f.rsp, f.ss);
    klog_error!("RAX: {:#x}  RBX: {:#x}  RCX: {:#x}", f.rax, f.rbx, f.rcx);
    klog_error!("RDX: {:#x}  RSI: {:#x}  RDI: {:#x}", f.rdx, f.rsi, f.rdi);
    klog_error!("RBP: {:#x}  R8: {:#x}  R9: {:#x}", f.rbp, f.r8, f.r9);
    klog_error!("R10: {:#x}  R11: {:#x}  R12: {:#x}", f.r10, f.r11, f.r12);
    klog_error!("R13: {:#x}  R14: {:#x}  R15: {:#x}", f.r13, f.r14, f.r15);
    klog_error!("=== END INTERRUPT FRAME DUMP ===");
}
