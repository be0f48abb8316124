//! APB1 clock gating and peripheral reset

use core::ptr::{read_volatile, write_volatile};

use itimer_hal::{ClockGate, ClockId};

const RCC_BASE: usize = 0x4002_1000;
const RCC_APB1RSTR: *mut u32 = (RCC_BASE + 0x10) as *mut u32;
const RCC_APB1ENR: *mut u32 = (RCC_BASE + 0x1C) as *mut u32;

/// APB1 enable/reset bit of TIM2
pub const TIM2_BIT: u32 = 0;
/// APB1 enable/reset bit of TIM3
pub const TIM3_BIT: u32 = 1;
/// APB1 enable/reset bit of TIM4
pub const TIM4_BIT: u32 = 2;

/// Reset and clock control, APB1 half.
///
/// A [`ClockId`] is the bit position in `APB1ENR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rcc {
    _private: (),
}

impl Rcc {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl ClockGate for Rcc {
    fn enable_clock(&mut self, clock: ClockId) {
        unsafe {
            let enr = read_volatile(RCC_APB1ENR);
            write_volatile(RCC_APB1ENR, enr | (1 << clock.0));
            // read back so the clock is running before the first register access
            let _ = read_volatile(RCC_APB1ENR);
        }
    }
}

/// Pulse the APB1 reset line of one peripheral
pub(crate) fn pulse_reset(bit: u32) {
    unsafe {
        let rst = read_volatile(RCC_APB1RSTR);
        write_volatile(RCC_APB1RSTR, rst | (1 << bit));
        write_volatile(RCC_APB1RSTR, rst & !(1 << bit));
    }
}
