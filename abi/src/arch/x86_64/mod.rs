//! x86_64 architecture definitions.
//!
//! Raw integer constants are wrapped in newtypes to prevent misuse:
//! - `Port(u16)` for I/O port addresses
//! - `PitCommand` bitflags for the 8254 mode/command register
//! - `SpeakerGate` bitflags for the system control port B

pub mod pit;
pub mod ports;

pub use pit::{PitCommand, PitMode, SpeakerGate};
pub use ports::Port;
