//! Hardware constants and definitions for the timer drivers.

pub mod irq_defs;
pub mod pit_defs;
