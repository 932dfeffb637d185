//! Strongly-typed particle and refinement-level identifiers.

use std::fmt;

/// Identifies one slot in the particle attribute arrays.
///
/// IDs are stable for the lifetime of the store: a slot keeps its ID
/// across deactivation and reuse, and backing-array growth never
/// renumbers existing slots. `ParticleId(n)` addresses the n-th element
/// of every attribute column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

impl ParticleId {
    /// The ID as a column index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ParticleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a mesh refinement level.
///
/// Levels are assigned by the mesh subsystem; the store only uses them
/// to maintain per-level active-particle counts. `Level(0)` is the root
/// (coarsest) level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Level(pub u32);

impl Level {
    /// The level as an index into per-level count tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Level {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_id_round_trip() {
        let id = ParticleId::from(42u64);
        assert_eq!(id.index(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn level_orders_by_depth() {
        assert!(Level(0) < Level(3));
        assert_eq!(Level::from(2u32).index(), 2);
    }
}
