//! Per-slot lifecycle state and inactive-marker sentinels.
//!
//! A slot's liveness is tracked by an explicit [`SlotState`] tag. For
//! compatibility with snapshot writers that scan the mass column, the
//! removal path *also* writes the marker's sentinel mass into the slot;
//! the tag is the authoritative record.

use std::fmt;

/// Why a slot became inactive.
///
/// The two markers are assigned by the domain-decomposition subsystem.
/// Each maps to a distinct negative sentinel mass, distinguishable from
/// any physically valid (non-negative) mass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InactiveMarker {
    /// The particle left the simulation domain (non-periodic
    /// boundaries).
    OutsideDomain,
    /// Ownership of the particle transferred to another rank during
    /// repartitioning.
    SentToOtherRank,
}

impl InactiveMarker {
    /// The sentinel value written into the mass column on removal.
    pub fn sentinel_mass(self) -> f64 {
        match self {
            Self::OutsideDomain => -1.0,
            Self::SentToOtherRank => -2.0,
        }
    }
}

impl fmt::Display for InactiveMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideDomain => write!(f, "outside-domain"),
            Self::SentToOtherRank => write!(f, "sent-to-other-rank"),
        }
    }
}

/// Lifecycle state of one slot.
///
/// Slots cycle `Active → Inactive → Active (reused)` and are never
/// individually freed; the whole store is released at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// The slot holds a physically present particle.
    Active,
    /// The slot is a tombstone; its ID is held in the free list.
    Inactive(InactiveMarker),
}

impl SlotState {
    /// Whether the slot holds an active particle.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// The inactive marker, if the slot is inactive.
    pub fn marker(self) -> Option<InactiveMarker> {
        match self {
            Self::Active => None,
            Self::Inactive(marker) => Some(marker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_distinct_and_negative() {
        let outside = InactiveMarker::OutsideDomain.sentinel_mass();
        let sent = InactiveMarker::SentToOtherRank.sentinel_mass();
        assert_ne!(outside, sent);
        assert!(outside < 0.0);
        assert!(sent < 0.0);
    }

    #[test]
    fn state_reports_marker() {
        assert!(SlotState::Active.is_active());
        assert_eq!(SlotState::Active.marker(), None);

        let state = SlotState::Inactive(InactiveMarker::SentToOtherRank);
        assert!(!state.is_active());
        assert_eq!(state.marker(), Some(InactiveMarker::SentToOtherRank));
    }
}
