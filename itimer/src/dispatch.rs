//! Callback table consulted by the hardware entry points

use crate::slot::{Slot, NUM_SLOTS};

/// Zero-argument tick callback. A plain function pointer, one machine word.
pub type Callback = fn();

/// Stand-in for unbound slots
fn stub() {}

/// Callback bound to each physical timer
#[derive(Debug, Clone)]
pub struct DispatchTable {
    entries: [Option<Callback>; NUM_SLOTS],
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTable {
    /// Every slot routed to the stub
    pub const fn new() -> Self {
        Self {
            entries: [None; NUM_SLOTS],
        }
    }

    /// Route `slot` to `callback`, replacing any earlier binding
    pub fn bind(&mut self, slot: Slot, callback: Callback) {
        self.entries[slot.index()] = Some(callback);
    }

    /// Route `slot` back to the stub
    pub fn unbind(&mut self, slot: Slot) {
        self.entries[slot.index()] = None;
    }

    /// Check whether `slot` has a real callback
    pub fn is_bound(&self, slot: Slot) -> bool {
        self.entries[slot.index()].is_some()
    }

    /// Callback to run for `slot`; the stub when nothing is bound
    pub fn callback(&self, slot: Slot) -> Callback {
        self.entries[slot.index()].unwrap_or(stub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    static HITS: AtomicUsize = AtomicUsize::new(0);

    fn count() {
        HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn unbound_slot_runs_stub() {
        let table = DispatchTable::new();
        for slot in Slot::ALL {
            assert!(!table.is_bound(slot));
            // must be callable
            (table.callback(slot))();
        }
    }

    #[test]
    fn bind_and_unbind() {
        let mut table = DispatchTable::new();
        let slot = Slot::ALL[1];

        table.bind(slot, count);
        assert!(table.is_bound(slot));
        assert!(!table.is_bound(Slot::ALL[0]));

        (table.callback(slot))();
        assert_eq!(HITS.load(Ordering::SeqCst), 1);

        table.unbind(slot);
        (table.callback(slot))();
        assert_eq!(HITS.load(Ordering::SeqCst), 1);
    }
}
