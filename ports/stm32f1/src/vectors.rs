//! Device vector entries for the timer bank

use itimer::{on_timer_interrupt, Slot};

use crate::timer::GeneralPurposeTimer;

#[no_mangle]
pub extern "C" fn TIM2() {
    on_timer_interrupt(Slot::ALL[0], &mut GeneralPurposeTimer::tim2());
}

#[no_mangle]
pub extern "C" fn TIM3() {
    on_timer_interrupt(Slot::ALL[1], &mut GeneralPurposeTimer::tim3());
}

#[no_mangle]
pub extern "C" fn TIM4() {
    on_timer_interrupt(Slot::ALL[2], &mut GeneralPurposeTimer::tim4());
}
