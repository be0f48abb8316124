//! TIM2/TIM3/TIM4 register blocks

use core::ptr::{read_volatile, write_volatile};

use itimer_hal::{ClockDivision, CountMode, TimeBase, TimerPeripheral};

use crate::rcc::{self, TIM2_BIT, TIM3_BIT, TIM4_BIT};

const TIM2_BASE: usize = 0x4000_0000;
const TIM3_BASE: usize = 0x4000_0400;
const TIM4_BASE: usize = 0x4000_0800;

const CR1: usize = 0x00;
const DIER: usize = 0x0C;
const SR: usize = 0x10;
const EGR: usize = 0x14;
const PSC: usize = 0x28;
const ARR: usize = 0x2C;

const CR1_CEN: u32 = 1 << 0;
const CR1_DIR: u32 = 1 << 4;
const CR1_CMS_SHIFT: u32 = 5;
const CR1_CMS: u32 = 0b11 << CR1_CMS_SHIFT;
const CR1_CKD_SHIFT: u32 = 8;
const CR1_CKD: u32 = 0b11 << CR1_CKD_SHIFT;
const DIER_UIE: u32 = 1 << 0;
const SR_UIF: u32 = 1 << 0;
const EGR_UG: u32 = 1 << 0;

/// CR1 with the counter mode and clock division fields replaced
const fn cr1_time_base(cr1: u32, time_base: &TimeBase) -> u32 {
    let mode = match time_base.count_mode {
        CountMode::Up => 0,
        CountMode::Down => CR1_DIR,
        CountMode::CenterAligned => 0b01 << CR1_CMS_SHIFT,
    };
    let division: u32 = match time_base.clock_division {
        ClockDivision::Div1 => 0b00,
        ClockDivision::Div2 => 0b01,
        ClockDivision::Div4 => 0b10,
    } << CR1_CKD_SHIFT;
    (cr1 & !(CR1_DIR | CR1_CMS | CR1_CKD)) | mode | division
}

/// One general-purpose timer
#[derive(Debug, Clone)]
pub struct GeneralPurposeTimer {
    base: usize,
    reset_bit: u32,
}

impl GeneralPurposeTimer {
    pub(crate) const fn tim2() -> Self {
        Self::at(TIM2_BASE, TIM2_BIT)
    }

    pub(crate) const fn tim3() -> Self {
        Self::at(TIM3_BASE, TIM3_BIT)
    }

    pub(crate) const fn tim4() -> Self {
        Self::at(TIM4_BASE, TIM4_BIT)
    }

    const fn at(base: usize, reset_bit: u32) -> Self {
        Self { base, reset_bit }
    }

    fn read(&self, offset: usize) -> u32 {
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    fn write(&mut self, offset: usize, value: u32) {
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }

    fn modify(&mut self, offset: usize, set: u32, clear: u32) {
        let value = self.read(offset);
        self.write(offset, (value & !clear) | set);
    }

    fn set_bits(&mut self, offset: usize, bits: u32, enabled: bool) {
        if enabled {
            self.modify(offset, bits, 0);
        } else {
            self.modify(offset, 0, bits);
        }
    }
}

impl TimerPeripheral for GeneralPurposeTimer {
    fn configure(&mut self, time_base: &TimeBase) {
        let cr1 = cr1_time_base(self.read(CR1), time_base);
        self.write(CR1, cr1);
        self.write(ARR, u32::from(time_base.period));
        self.write(PSC, u32::from(time_base.prescaler));
        // TIM2..TIM4 have no repetition counter
        self.write(EGR, EGR_UG);
    }

    fn set_counting(&mut self, enabled: bool) {
        self.set_bits(CR1, CR1_CEN, enabled);
    }

    fn set_update_interrupt(&mut self, enabled: bool) {
        self.set_bits(DIER, DIER_UIE, enabled);
    }

    fn is_update_pending(&self) -> bool {
        self.read(SR) & SR_UIF != 0 && self.read(DIER) & DIER_UIE != 0
    }

    fn clear_update_pending(&mut self) {
        // rc_w0: writing 1 leaves the other flags alone
        self.write(SR, !SR_UIF);
    }

    fn set_reload_and_prescaler(&mut self, period: u16, prescaler: u16) {
        self.write(ARR, u32::from(period));
        self.write(PSC, u32::from(prescaler));
    }

    fn force_reload(&mut self) {
        self.write(EGR, EGR_UG);
    }

    fn reset_to_default(&mut self) {
        rcc::pulse_reset(self.reset_bit);
    }
}
