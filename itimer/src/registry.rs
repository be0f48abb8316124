//! Process-wide allocation pool and dispatch table
//!
//! Hardware entry points cannot carry a context argument, so the pool and
//! the dispatch table live in one `static` [`Registry`]. Every access goes
//! through a critical section: handle operations mutate it from thread
//! context while entry points read it from interrupt context.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;
use itimer_hal::TimerPeripheral;
use log::trace;

use crate::dispatch::{Callback, DispatchTable};
use crate::pool::{AllocationPool, PoolStats};
use crate::slot::{Slot, SlotRequest, NUM_SLOTS};
use crate::SitResult;

/// What an entry point did with one interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Update flag was not pending; nothing ran
    Spurious,
    /// Flag cleared and the bound callback ran
    Delivered,
    /// Flag cleared, no callback bound
    Unbound,
}

#[cfg(feature = "defmt")]
impl defmt::Format for DispatchOutcome {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DispatchOutcome::Spurious => defmt::write!(fmt, "Spurious"),
            DispatchOutcome::Delivered => defmt::write!(fmt, "Delivered"),
            DispatchOutcome::Unbound => defmt::write!(fmt, "Unbound"),
        }
    }
}

struct RegistryState {
    pool: AllocationPool,
    dispatch: DispatchTable,
}

/// Allocation pool and dispatch table for one bank of physical timers
pub struct Registry {
    state: Mutex<RefCell<RegistryState>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// All slots free, all callbacks stubbed
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(RegistryState {
                pool: AllocationPool::new(),
                dispatch: DispatchTable::new(),
            })),
        }
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RegistryState) -> R,
    {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            f(&mut state)
        })
    }

    /// Claim a slot from the pool
    pub fn claim(&self, request: SlotRequest) -> SitResult<Slot> {
        self.with_state(|state| state.pool.claim(request))
    }

    /// Return `slot` to the pool; its binding is left alone
    pub fn release(&self, slot: Slot) {
        self.with_state(|state| state.pool.release(slot))
    }

    /// Route interrupts of `slot` to `callback`
    pub fn bind(&self, slot: Slot, callback: Callback) {
        self.with_state(|state| state.dispatch.bind(slot, callback))
    }

    /// Unbind and release `slot` in a single critical section
    pub fn retire(&self, slot: Slot) {
        self.with_state(|state| {
            state.dispatch.unbind(slot);
            state.pool.release(slot);
        })
    }

    /// Callback an entry point for `slot` would run now
    pub fn callback(&self, slot: Slot) -> Callback {
        self.with_state(|state| state.dispatch.callback(slot))
    }

    /// Check whether `slot` is claimed
    pub fn is_in_use(&self, slot: Slot) -> bool {
        self.with_state(|state| state.pool.is_in_use(slot))
    }

    /// Check whether `slot` has a callback other than the stub
    pub fn is_bound(&self, slot: Slot) -> bool {
        self.with_state(|state| state.dispatch.is_bound(slot))
    }

    /// Pool usage snapshot
    pub fn stats(&self) -> PoolStats {
        self.with_state(|state| state.pool.stats())
    }

    /// Claimed slots in ascending order
    pub fn in_use_slots(&self) -> Vec<Slot, NUM_SLOTS> {
        self.with_state(|state| state.pool.in_use_slots())
    }

    /// Body of the hardware entry point for `slot`.
    ///
    /// The update flag is cleared before the callback runs. The callback is
    /// invoked outside the critical section, so it may use handle operations.
    pub fn service<T>(&self, slot: Slot, timer: &mut T) -> DispatchOutcome
    where
        T: TimerPeripheral + ?Sized,
    {
        if !timer.is_update_pending() {
            trace!("{}: spurious entry", slot);
            return DispatchOutcome::Spurious;
        }
        timer.clear_update_pending();

        let (callback, bound) = self.with_state(|state| {
            (
                state.dispatch.callback(slot),
                state.dispatch.is_bound(slot),
            )
        });
        callback();

        if bound {
            DispatchOutcome::Delivered
        } else {
            DispatchOutcome::Unbound
        }
    }
}

static REGISTRY: Registry = Registry::new();

/// The process-wide registry used by [`IntervalTimer::new`](crate::IntervalTimer::new)
/// and by [`on_timer_interrupt`].
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Service one interrupt of `slot` through the process-wide registry.
///
/// Ports call this from the named vector of each physical timer.
pub fn on_timer_interrupt<T>(slot: Slot, timer: &mut T) -> DispatchOutcome
where
    T: TimerPeripheral + ?Sized,
{
    REGISTRY.service(slot, timer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTimer;
    use core::sync::atomic::{AtomicUsize, Ordering};

    static TICKS: AtomicUsize = AtomicUsize::new(0);

    fn tick() {
        TICKS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn retire_unbinds_and_releases() {
        let registry = Registry::new();
        let slot = registry.claim(SlotRequest::Auto).unwrap();
        registry.bind(slot, tick);
        assert!(registry.is_in_use(slot));
        assert!(registry.is_bound(slot));

        registry.retire(slot);
        assert!(!registry.is_in_use(slot));
        assert!(!registry.is_bound(slot));
        assert!(registry.stats().is_idle());
    }

    #[test]
    fn service_clears_flag_then_delivers() {
        let registry = Registry::new();
        let slot = Slot::ALL[2];
        registry.claim(SlotRequest::Specific(slot)).unwrap();
        registry.bind(slot, tick);

        let mut timer = MockTimer::new();
        assert_eq!(registry.service(slot, &mut timer), DispatchOutcome::Spurious);
        assert_eq!(TICKS.load(Ordering::SeqCst), 0);

        timer.raise_update();
        assert_eq!(registry.service(slot, &mut timer), DispatchOutcome::Delivered);
        assert_eq!(TICKS.load(Ordering::SeqCst), 1);
        assert!(!timer.is_update_pending());
    }

    #[test]
    fn service_unbound_slot_runs_stub() {
        let registry = Registry::new();
        let mut timer = MockTimer::new();
        timer.raise_update();
        assert_eq!(
            registry.service(Slot::ALL[0], &mut timer),
            DispatchOutcome::Unbound
        );
        assert!(!timer.is_update_pending());
    }

    #[test]
    fn global_entry_point_ignores_spurious() {
        let mut timer = MockTimer::new();
        assert_eq!(
            on_timer_interrupt(Slot::ALL[1], &mut timer),
            DispatchOutcome::Spurious
        );
        assert_eq!(timer.clear_count(), 0);
    }
}
