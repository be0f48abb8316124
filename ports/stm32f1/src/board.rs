//! TIM2/TIM3/TIM4 as the slot table

use itimer::{Board, SitConfig, Slot, SlotDescriptor, NUM_SLOTS};
use itimer_hal::{ClockId, IrqNumber};

use crate::nvic::Nvic;
use crate::rcc::{Rcc, TIM2_BIT, TIM3_BIT, TIM4_BIT};
use crate::timer::GeneralPurposeTimer;

/// STM32F1 timer bank: TIM2, TIM3 and TIM4 on APB1.
///
/// Clones address the same hardware, so each [`IntervalTimer`] can own one
/// while the process-wide registry keeps them on distinct slots.
///
/// [`IntervalTimer`]: itimer::IntervalTimer
#[derive(Debug, Clone)]
pub struct Stm32f1Board {
    timers: [GeneralPurposeTimer; NUM_SLOTS],
    rcc: Rcc,
    nvic: Nvic,
    config: SitConfig,
}

impl Stm32f1Board {
    /// Board clocked at 72 MHz with the default priority
    pub const fn new() -> Self {
        Self::with_config(SitConfig::DEFAULT)
    }

    /// Board with a different timer clock or priority
    pub const fn with_config(config: SitConfig) -> Self {
        Self {
            timers: [
                GeneralPurposeTimer::tim2(),
                GeneralPurposeTimer::tim3(),
                GeneralPurposeTimer::tim4(),
            ],
            rcc: Rcc::new(),
            nvic: Nvic::new(),
            config,
        }
    }
}

impl Default for Stm32f1Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for Stm32f1Board {
    type Timer = GeneralPurposeTimer;
    type Clocks = Rcc;
    type Interrupts = Nvic;

    const SLOTS: [SlotDescriptor; NUM_SLOTS] = [
        SlotDescriptor::new("TIM2", ClockId(TIM2_BIT), IrqNumber(28)),
        SlotDescriptor::new("TIM3", ClockId(TIM3_BIT), IrqNumber(29)),
        SlotDescriptor::new("TIM4", ClockId(TIM4_BIT), IrqNumber(30)),
    ];

    fn config(&self) -> SitConfig {
        self.config
    }

    fn timer(&mut self, slot: Slot) -> &mut GeneralPurposeTimer {
        &mut self.timers[slot.index()]
    }

    fn clocks(&mut self) -> &mut Rcc {
        &mut self.rcc
    }

    fn interrupts(&mut self) -> &mut Nvic {
        &mut self.nvic
    }
}
