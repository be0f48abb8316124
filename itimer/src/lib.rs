#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # itimer
//!
//! Periodic-interrupt services on top of a small, fixed bank of hardware
//! timers. An [`IntervalTimer`] handle claims one physical timer from the
//! process-wide [`Registry`], programs it for a fixed repeating period and
//! routes the timer's interrupt to a plain `fn()` callback.
//!
//! ## Module Overview
//! - [`slot`]     – physical timer indices and allocation requests.
//! - [`pool`]     – which physical timers are claimed.
//! - [`dispatch`] – callback bound to each physical timer.
//! - [`registry`] – the process-wide pool + dispatch table and the body of
//!   every hardware entry point.
//! - [`config`]   – tick scales, intervals and prescaler configuration.
//! - [`board`]    – per-target table tying slots to peripherals and IRQ lines.
//! - [`timer`]    – the interval timer handle and its state machine.
//!
//! Hardware is reached only through the traits of [`itimer_hal`], so the
//! whole crate runs on the host against the [`mock`] board.

use core::fmt;

pub mod board;
pub mod config;
pub mod dispatch;
pub mod pool;
pub mod registry;
pub mod slot;
pub mod timer;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use board::{Board, SlotDescriptor};
pub use config::{Interval, Scale, SitConfig, SitConfigBuilder};
pub use dispatch::{Callback, DispatchTable};
pub use pool::{AllocationPool, PoolStats};
pub use registry::{on_timer_interrupt, registry, DispatchOutcome, Registry};
pub use slot::{Slot, SlotRequest, NUM_SLOTS};
pub use timer::{InterruptState, IntervalTimer, Status};

pub use itimer_hal as hal;

/// Result type used throughout the crate
pub type SitResult<T> = Result<T, SitError>;

/// Errors reported by interval timer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitError {
    /// No physical timer matches the request
    ResourceExhausted,
    /// Slot index outside the physical timer bank
    InvalidSlot(u8),
    /// Period of zero or beyond what the tick scales can express
    InvalidPeriod,
    /// Operation needs a running timer
    NotRunning,
    /// Clock configuration cannot produce the tick scales
    InvalidConfig,
}

impl fmt::Display for SitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SitError::ResourceExhausted => write!(f, "No interval timer available"),
            SitError::InvalidSlot(index) => write!(f, "Invalid timer slot {}", index),
            SitError::InvalidPeriod => write!(f, "Invalid timer period"),
            SitError::NotRunning => write!(f, "Interval timer is not running"),
            SitError::InvalidConfig => write!(f, "Invalid timer clock configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SitError {}

#[cfg(feature = "defmt")]
impl defmt::Format for SitError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SitError::ResourceExhausted => defmt::write!(fmt, "ResourceExhausted"),
            SitError::InvalidSlot(index) => defmt::write!(fmt, "InvalidSlot({})", index),
            SitError::InvalidPeriod => defmt::write!(fmt, "InvalidPeriod"),
            SitError::NotRunning => defmt::write!(fmt, "NotRunning"),
            SitError::InvalidConfig => defmt::write!(fmt, "InvalidConfig"),
        }
    }
}
