//! Hardware collaborator interfaces for the interval timer allocator
//!
//! This crate describes the narrow services the allocator needs from the
//! target: a timer peripheral register interface, an interrupt controller and
//! a peripheral clock gate. It holds no state and performs no hardware access
//! itself; ports implement the traits for a concrete microcontroller.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod clock;
pub mod interrupt;
pub mod timer;

// Re-export commonly used types
pub use clock::{ClockGate, ClockId};
pub use interrupt::{InterruptController, IrqNumber, IrqPriority};
pub use timer::{ClockDivision, CountMode, TimeBase, TimerPeripheral};
