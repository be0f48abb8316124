//! Per-target hardware table

use itimer_hal::{ClockGate, ClockId, InterruptController, IrqNumber, TimerPeripheral};

use crate::config::SitConfig;
use crate::slot::{Slot, NUM_SLOTS};

/// Static facts about the physical timer behind one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDescriptor {
    /// Peripheral name, for diagnostics
    pub name: &'static str,
    /// Clock gate feeding the peripheral
    pub clock: ClockId,
    /// Interrupt line of the peripheral's update event
    pub irq: IrqNumber,
}

impl SlotDescriptor {
    /// Describe the timer `name`, gated by `clock` and signalling on `irq`
    pub const fn new(name: &'static str, clock: ClockId, irq: IrqNumber) -> Self {
        Self { name, clock, irq }
    }
}

/// Access to the timer bank of one target.
///
/// [`SLOTS`](Board::SLOTS) is the only place that maps a slot to its
/// peripheral, clock and interrupt line; adding a physical timer means
/// editing that table and [`NUM_SLOTS`].
pub trait Board {
    type Timer: TimerPeripheral;
    type Clocks: ClockGate;
    type Interrupts: InterruptController;

    /// Slot table, indexed by [`Slot::index`]
    const SLOTS: [SlotDescriptor; NUM_SLOTS];

    /// Clock and priority settings
    fn config(&self) -> SitConfig {
        SitConfig::default()
    }

    fn descriptor(&self, slot: Slot) -> SlotDescriptor {
        Self::SLOTS[slot.index()]
    }

    fn timer(&mut self, slot: Slot) -> &mut Self::Timer;

    fn clocks(&mut self) -> &mut Self::Clocks;

    fn interrupts(&mut self) -> &mut Self::Interrupts;
}
