//! Legacy IRQ line numbering.

/// Number of legacy ISA IRQ lines
pub const IRQ_LINES: usize = 16;

/// IDT vector IRQ 0 is remapped to
pub const IRQ_BASE_VECTOR: u8 = 32;
