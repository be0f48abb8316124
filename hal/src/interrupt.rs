//! Interrupt controller abstraction

use core::fmt;

/// Device interrupt line number (position in the vector table after the
/// core exceptions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqNumber(pub u16);

impl IrqNumber {
    pub const fn new(line: u16) -> Self {
        Self(line)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for IrqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IRQ{}", self.0)
    }
}

/// Preemption / sub-priority pair (0 = highest on most platforms).
///
/// Lines with the same preemption level never preempt each other; the
/// sub-priority only orders pending lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqPriority {
    pub preemption: u8,
    pub sub: u8,
}

impl IrqPriority {
    pub const fn new(preemption: u8, sub: u8) -> Self {
        Self { preemption, sub }
    }
}

/// Interrupt controller abstraction
pub trait InterruptController {
    /// Program the priority of `line` and enable or disable it.
    ///
    /// The priority is ignored when disabling.
    fn set_interrupt(&mut self, line: IrqNumber, priority: IrqPriority, enabled: bool);

    /// Check whether `line` is currently enabled
    fn is_enabled(&self, line: IrqNumber) -> bool;
}
