//! Allocation pool of physical timers
//!
//! Tracks which of the [`NUM_SLOTS`] physical timers are claimed. The pool
//! never touches hardware; it only answers "which slot may this handle use".

use heapless::Vec;
use log::{debug, warn};

use crate::slot::{Slot, SlotRequest, NUM_SLOTS};
use crate::{SitError, SitResult};

/// Pool statistics for debugging and monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of physical timers
    pub total_slots: usize,
    /// Number of slots currently free
    pub free_slots: usize,
    /// Number of slots currently claimed
    pub used_slots: usize,
    /// Minimum number of free slots ever reached
    pub min_free_slots: usize,
}

impl PoolStats {
    /// Create statistics for an all-free pool
    pub const fn new(total_slots: usize) -> Self {
        Self {
            total_slots,
            free_slots: total_slots,
            used_slots: 0,
            min_free_slots: total_slots,
        }
    }

    fn on_claim(&mut self) {
        self.used_slots += 1;
        self.free_slots -= 1;
        if self.free_slots < self.min_free_slots {
            self.min_free_slots = self.free_slots;
        }
    }

    fn on_release(&mut self) {
        if self.used_slots > 0 {
            self.used_slots -= 1;
            self.free_slots += 1;
        }
    }

    /// Check if every slot is claimed
    pub const fn is_exhausted(&self) -> bool {
        self.free_slots == 0
    }

    /// Check if no slot is claimed
    pub const fn is_idle(&self) -> bool {
        self.used_slots == 0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PoolStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "PoolStats{{ total: {}, free: {}, used: {}, min_free: {} }}",
            self.total_slots,
            self.free_slots,
            self.used_slots,
            self.min_free_slots
        );
    }
}

/// In-use bitset over the physical timers
#[derive(Debug, Clone)]
pub struct AllocationPool {
    in_use: [bool; NUM_SLOTS],
    stats: PoolStats,
}

impl Default for AllocationPool {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocationPool {
    /// All slots free
    pub const fn new() -> Self {
        Self {
            in_use: [false; NUM_SLOTS],
            stats: PoolStats::new(NUM_SLOTS),
        }
    }

    /// Claim a slot.
    ///
    /// A specific request succeeds only if that slot is free. An automatic
    /// request takes the lowest free index.
    pub fn claim(&mut self, request: SlotRequest) -> SitResult<Slot> {
        let slot = match request {
            SlotRequest::Specific(slot) if !self.in_use[slot.index()] => slot,
            SlotRequest::Specific(_) => {
                warn!("pool: {} requested but in use", request);
                return Err(SitError::ResourceExhausted);
            }
            SlotRequest::Auto => match Slot::ALL.into_iter().find(|s| !self.in_use[s.index()]) {
                Some(slot) => slot,
                None => {
                    warn!("pool: no free slot for auto request");
                    return Err(SitError::ResourceExhausted);
                }
            },
        };

        self.in_use[slot.index()] = true;
        self.stats.on_claim();
        debug!("pool: claimed {} ({})", slot, request);
        Ok(slot)
    }

    /// Return a slot to the pool. Only the slot's owner may call this.
    pub fn release(&mut self, slot: Slot) {
        if !self.in_use[slot.index()] {
            warn!("pool: release of free {}", slot);
            return;
        }
        self.in_use[slot.index()] = false;
        self.stats.on_release();
        debug!("pool: released {}", slot);
    }

    pub fn is_in_use(&self, slot: Slot) -> bool {
        self.in_use[slot.index()]
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Claimed slots in index order
    pub fn in_use_slots(&self) -> Vec<Slot, NUM_SLOTS> {
        Slot::ALL
            .into_iter()
            .filter(|slot| self.in_use[slot.index()])
            .collect()
    }
}
