//! NVIC access for the timer interrupt lines

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;
use itimer_hal::{InterruptController, IrqNumber, IrqPriority};
use log::trace;

/// Priority bits implemented by the STM32F1 NVIC
pub const PRIORITY_BITS: u8 = 4;

/// Bits of the priority field used for the preemption level; the rest hold
/// the sub-priority. Matches `NVIC_PriorityGroup_2` in the vendor library.
pub const PREEMPTION_BITS: u8 = 2;

const SUB_BITS: u8 = PRIORITY_BITS - PREEMPTION_BITS;

/// Priority register byte for a preemption/sub pair.
///
/// Out-of-range parts are truncated to their field width; the result sits
/// in the implemented upper bits.
pub const fn encode_priority(priority: IrqPriority) -> u8 {
    let preemption = priority.preemption & ((1 << PREEMPTION_BITS) - 1);
    let sub = priority.sub & ((1 << SUB_BITS) - 1);
    ((preemption << SUB_BITS) | sub) << (8 - PRIORITY_BITS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line(u16);

// SAFETY: only built from the board's slot table, which holds valid
// STM32F1 device interrupt numbers.
unsafe impl InterruptNumber for Line {
    fn number(self) -> u16 {
        self.0
    }
}

impl From<IrqNumber> for Line {
    fn from(irq: IrqNumber) -> Self {
        Line(irq.raw())
    }
}

/// Nested vectored interrupt controller.
///
/// Holds no core peripheral: every copy reaches the same registers, and a
/// handle only ever touches the line of the slot it owns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nvic {
    _private: (),
}

impl Nvic {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl InterruptController for Nvic {
    fn set_interrupt(&mut self, line: IrqNumber, priority: IrqPriority, enabled: bool) {
        let irq = Line::from(line);
        if enabled {
            let byte = encode_priority(priority);
            trace!("nvic: {} on, priority {:#04x}", line, byte);
            // SAFETY: IPR is byte addressable on ARMv7-M and the line belongs
            // to the calling handle. The handler for every slot line is
            // installed by the `rt` vectors or by the firmware, and the
            // priority is written before the line is unmasked.
            unsafe {
                (*NVIC::PTR).ipr[usize::from(irq.number())].write(byte);
                NVIC::unmask(irq);
            }
        } else {
            trace!("nvic: {} off", line);
            NVIC::mask(irq);
        }
    }

    fn is_enabled(&self, line: IrqNumber) -> bool {
        NVIC::is_enabled(Line::from(line))
    }
}
