//! Peripheral clock gating

/// Opaque identifier of a peripheral clock gate (bus enable bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockId(pub u32);

/// Peripheral clock controller
pub trait ClockGate {
    /// Turn on the clock feeding a peripheral. Enabling an already running
    /// clock has no effect.
    fn enable_clock(&mut self, clock: ClockId);
}
