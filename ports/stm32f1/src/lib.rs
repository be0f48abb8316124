#![cfg_attr(not(test), no_std)]

//! STM32F1 port for the interval timer allocator.
//!
//! The three general-purpose timers TIM2, TIM3 and TIM4 back slots 0, 1 and
//! 2. [`Stm32f1Board`] hands them to [`itimer::IntervalTimer`]; with the
//! `rt` feature this crate also exports the `TIM2`/`TIM3`/`TIM4` vector
//! symbols, each of which feeds [`itimer::on_timer_interrupt`].
//!
//! The final firmware picks the `critical-section` implementation, usually
//! through `cortex-m/critical-section-single-core`.

pub mod board;
pub mod nvic;
pub mod rcc;
pub mod timer;

#[cfg(feature = "rt")]
mod vectors;

pub use board::Stm32f1Board;
pub use nvic::{encode_priority, Nvic, PREEMPTION_BITS, PRIORITY_BITS};
pub use rcc::Rcc;
pub use timer::GeneralPurposeTimer;
