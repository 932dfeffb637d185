//! LIFO registry of reusable (inactive) particle IDs.

use parsec_core::{ConsistencyError, ParticleId};

use crate::growth::GrowthPolicy;

/// Free list of slot IDs available for reuse.
///
/// Push/pop are O(1); the most recently deactivated slot is the first
/// to be reused. Backing capacity is tracked explicitly and grown by
/// the store's [`GrowthPolicy`] on overflow, independently of the
/// attribute columns.
pub struct InactiveIdRegistry {
    ids: Vec<ParticleId>,
    capacity: usize,
}

impl InactiveIdRegistry {
    /// Create a registry with the given initial capacity.
    ///
    /// The store seeds this as `max(1, column_capacity / 100)`, so it
    /// is never zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an ID, growing the backing storage if full.
    pub fn push(&mut self, id: ParticleId, policy: &GrowthPolicy) {
        if self.ids.len() >= self.capacity {
            self.capacity = policy.grow(self.capacity);
            self.ids.reserve_exact(self.capacity - self.ids.len());
        }
        self.ids.push(id);
    }

    /// Remove and return the most recently pushed ID.
    pub fn pop(&mut self) -> Result<ParticleId, ConsistencyError> {
        self.ids.pop().ok_or(ConsistencyError::FreeListEmpty)
    }

    /// Number of IDs currently held.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the registry holds no IDs.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Current backing capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether an ID is held. O(n); intended for validation, not the
    /// hot path.
    pub fn contains(&self, id: ParticleId) -> bool {
        self.ids.contains(&id)
    }

    /// Iterate over held IDs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.ids.iter().copied()
    }
}
