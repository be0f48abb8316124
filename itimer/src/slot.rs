//! Physical timer indices and allocation requests

use core::fmt;

use crate::{SitError, SitResult};

/// Number of physical timers managed by the allocator
pub const NUM_SLOTS: usize = 3;

/// Index of one physical timer, always `< NUM_SLOTS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u8);

impl Slot {
    /// Every slot, in auto-allocation order
    pub const ALL: [Slot; NUM_SLOTS] = {
        let mut all = [Slot(0); NUM_SLOTS];
        let mut i = 0;
        while i < NUM_SLOTS {
            all[i] = Slot(i as u8);
            i += 1;
        }
        all
    };

    /// Create a slot, rejecting indices outside the timer bank
    pub const fn new(index: u8) -> SitResult<Self> {
        if (index as usize) < NUM_SLOTS {
            Ok(Slot(index))
        } else {
            Err(SitError::InvalidSlot(index))
        }
    }

    /// Position in per-slot tables
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Index as the raw request byte
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Slot {
    type Error = SitError;

    fn try_from(index: u8) -> SitResult<Self> {
        Slot::new(index)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Slot {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "slot{}", self.0);
    }
}

/// Which physical timer a `begin` should claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotRequest {
    /// First free slot, lowest index first
    #[default]
    Auto,
    /// Exactly this slot, or nothing
    Specific(Slot),
}

impl SlotRequest {
    /// Raw request value meaning "allocate from the pool"
    pub const AUTO_RAW: u8 = 255;

    /// Decode a raw request byte.
    ///
    /// [`AUTO_RAW`](Self::AUTO_RAW) selects auto-allocation and `0..NUM_SLOTS`
    /// a specific slot. Any other value is rejected rather than treated as
    /// auto-allocation.
    pub const fn from_raw(raw: u8) -> SitResult<Self> {
        if raw == Self::AUTO_RAW {
            return Ok(SlotRequest::Auto);
        }
        match Slot::new(raw) {
            Ok(slot) => Ok(SlotRequest::Specific(slot)),
            Err(err) => Err(err),
        }
    }

    /// `true` for [`SlotRequest::Auto`]
    pub const fn is_auto(&self) -> bool {
        matches!(self, SlotRequest::Auto)
    }
}

impl From<Slot> for SlotRequest {
    fn from(slot: Slot) -> Self {
        SlotRequest::Specific(slot)
    }
}

impl From<Option<Slot>> for SlotRequest {
    fn from(slot: Option<Slot>) -> Self {
        match slot {
            Some(slot) => SlotRequest::Specific(slot),
            None => SlotRequest::Auto,
        }
    }
}

impl fmt::Display for SlotRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRequest::Auto => write!(f, "auto"),
            SlotRequest::Specific(slot) => write!(f, "{}", slot),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SlotRequest {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SlotRequest::Auto => defmt::write!(fmt, "auto"),
            SlotRequest::Specific(slot) => defmt::write!(fmt, "{}", slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_slots_in_order() {
        let raw: Vec<u8> = Slot::ALL.iter().map(|s| s.raw()).collect();
        assert_eq!(raw, vec![0, 1, 2]);
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert_eq!(Slot::new(2).map(Slot::index), Ok(2));
        assert_eq!(Slot::new(3), Err(SitError::InvalidSlot(3)));
        assert_eq!(Slot::try_from(200u8), Err(SitError::InvalidSlot(200)));
    }

    #[test]
    fn raw_request_decoding() {
        assert_eq!(SlotRequest::from_raw(255), Ok(SlotRequest::Auto));
        assert_eq!(
            SlotRequest::from_raw(1),
            Ok(SlotRequest::Specific(Slot::ALL[1]))
        );
        // One past the bank is a caller error, not auto-allocation
        assert_eq!(SlotRequest::from_raw(3), Err(SitError::InvalidSlot(3)));
        assert_eq!(SlotRequest::from_raw(4), Err(SitError::InvalidSlot(4)));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(SlotRequest::from(None), SlotRequest::Auto);
        assert_eq!(
            SlotRequest::from(Some(Slot::ALL[0])),
            SlotRequest::Specific(Slot::ALL[0])
        );
        assert!(SlotRequest::default().is_auto());
    }
}
