//! Exclusive claims on PIO state machines.
//!
//! Each PIO block has four state machines. A driver must hold a [`ChannelClaim`] for
//! the state machine it runs; the only way to get one is from a [`ChannelArena`], and
//! each slot can be claimed once. There is no release: firmware keeps its drivers
//! until reset.

use portable_atomic::{AtomicBool, Ordering};

use crate::{Error, Result};

/// State machines per PIO block.
pub const CHANNELS_PER_PIO: usize = 4;

/// Capability for one claimed state machine. Not `Clone`; cannot be built outside this module.
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct ChannelClaim {
    index: u8,
}

impl ChannelClaim {
    /// Index of the claimed state machine within its arena.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.index
    }
}

/// Fixed set of claimable state machine slots.
pub struct ChannelArena<const N: usize = CHANNELS_PER_PIO> {
    claimed: [AtomicBool; N],
}

impl<const N: usize> ChannelArena<N> {
    /// All slots free.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            claimed: [const { AtomicBool::new(false) }; N],
        }
    }

    /// Claim slot `index`.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelUnavailable`] if `index` is out of range or already claimed.
    pub fn claim(&self, index: usize) -> Result<ChannelClaim> {
        let slot = self.claimed.get(index).ok_or(Error::ChannelUnavailable)?;
        let index = u8::try_from(index).map_err(|_| Error::ChannelUnavailable)?;
        slot.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ChannelUnavailable)?;
        Ok(ChannelClaim { index })
    }

    /// Claim the lowest free slot.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelUnavailable`] if every slot is taken.
    pub fn claim_unused(&self) -> Result<ChannelClaim> {
        (0..N)
            .find_map(|index| self.claim(index).ok())
            .ok_or(Error::ChannelUnavailable)
    }

    /// True if slot `index` has been claimed (out-of-range slots report `false`).
    #[must_use]
    pub fn is_claimed(&self, index: usize) -> bool {
        self.claimed
            .get(index)
            .is_some_and(|slot| slot.load(Ordering::Acquire))
    }
}

impl<const N: usize> Default for ChannelArena<N> {
    fn default() -> Self {
        Self::new()
    }
}
