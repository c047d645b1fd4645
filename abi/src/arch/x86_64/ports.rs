//! x86 I/O port addresses used by the timer driver.
//!
//! `Port` is a newtype over the raw port number so that channel data ports,
//! the command register and unrelated u16 values cannot be mixed up.

/// x86 I/O port address.
///
/// # Example
///
/// ```ignore
/// use pitmux_abi::arch::x86_64::ports::Port;
///
/// platform.outb(Port::PIT_COMMAND, command.bits());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Port(pub u16);

impl Port {
    // =========================================================================
    // Programmable Interval Timer (8254 PIT)
    // =========================================================================

    /// PIT Channel 0 data port (drives IRQ 0).
    pub const PIT_CHANNEL0: Self = Self(0x40);

    /// PIT Channel 2 data port (PC speaker).
    pub const PIT_CHANNEL2: Self = Self(0x42);

    /// PIT Command/mode register port. Write-only.
    pub const PIT_COMMAND: Self = Self(0x43);

    // =========================================================================
    // System Control
    // =========================================================================

    /// System control port B: channel 2 gate and speaker data enable.
    pub const SYSTEM_CONTROL_B: Self = Self(0x61);

    // =========================================================================
    // Methods
    // =========================================================================

    /// Get the raw port number for IN/OUT instructions.
    #[inline]
    pub const fn number(self) -> u16 {
        self.0
    }

    /// Create a new port from a raw address.
    #[inline]
    pub const fn new(addr: u16) -> Self {
        Self(addr)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pit_ports_are_contiguous() {
        assert_eq!(Port::PIT_CHANNEL0.number() + 2, Port::PIT_CHANNEL2.number());
        assert_eq!(Port::PIT_CHANNEL0.number() + 3, Port::PIT_COMMAND.number());
    }

    #[test]
    fn raw_conversion() {
        assert_eq!(u16::from(Port::SYSTEM_CONTROL_B), 0x61);
        assert_eq!(Port::new(0x43), Port::PIT_COMMAND);
    }
}
