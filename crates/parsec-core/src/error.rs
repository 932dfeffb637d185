//! Error types for the Parsec particle storage workspace.
//!
//! Two failure classes exist: configuration problems detected once at
//! store construction ([`ConfigError`]), and lifecycle invariant
//! violations detected during add/remove ([`ConsistencyError`]). Both
//! are fatal to the surrounding simulation — there is no degraded mode —
//! so callers typically abort on either.

use std::error::Error;
use std::fmt;

use crate::id::{Level, ParticleId};

/// Errors detected while validating a [`StoreConfig`](crate::StoreConfig).
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// No interpolation scheme was configured. The ghost-zone width
    /// cannot be derived without one.
    InterpolationUnset,
    /// The store was configured with zero refinement levels.
    NoLevels,
    /// Two passive attributes share the same name.
    DuplicatePassiveAttribute {
        /// The repeated attribute name.
        name: String,
    },
    /// The array growth factor is below 1.0, which would shrink (or
    /// never grow) the backing storage on overflow.
    GrowthFactorTooSmall {
        /// The rejected factor.
        factor: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InterpolationUnset => write!(f, "interpolation scheme is unset"),
            Self::NoLevels => write!(f, "store configured with zero refinement levels"),
            Self::DuplicatePassiveAttribute { name } => {
                write!(f, "duplicate passive attribute '{name}'")
            }
            Self::GrowthFactorTooSmall { factor } => {
                write!(f, "growth factor {factor} is below the minimum of 1.0")
            }
        }
    }
}

impl Error for ConfigError {}

/// Lifecycle invariant violations detected during add/remove.
///
/// Every variant indicates a caller bug (a stale ID, a mismatched
/// schema, corrupted accounting). The store's state is still coherent
/// when one of these is returned — the offending operation was rejected
/// before mutating anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsistencyError {
    /// A particle ID at or beyond the occupied range of the store.
    IdOutOfRange {
        /// The offending ID.
        id: ParticleId,
        /// Number of occupied slots (active + inactive).
        count_total: u64,
    },
    /// Attempted to remove a slot that is already inactive.
    SlotAlreadyInactive {
        /// The offending ID.
        id: ParticleId,
    },
    /// Attempted to pop a reusable ID from an empty free list.
    FreeListEmpty,
    /// The active/inactive accounting no longer sums to the occupied
    /// slot count.
    CountMismatch {
        /// Active-particle count.
        active: u64,
        /// Inactive-particle count.
        inactive: u64,
        /// Occupied slot count.
        total: u64,
    },
    /// The number of passive values supplied does not match the number
    /// of configured passive attributes.
    PassiveArityMismatch {
        /// Configured passive attribute count.
        expected: usize,
        /// Supplied value count.
        got: usize,
    },
    /// A refinement level at or beyond the configured level count.
    LevelOutOfRange {
        /// The offending level.
        level: Level,
        /// Configured number of levels.
        n_levels: usize,
    },
    /// A removal named a level whose active-particle count is already
    /// zero. Typically an initial-population slot whose level was never
    /// seeded via the per-level count setter.
    LevelCountUnderflow {
        /// The level whose count would go negative.
        level: Level,
    },
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdOutOfRange { id, count_total } => {
                write!(f, "particle ID {id} out of range (occupied slots: {count_total})")
            }
            Self::SlotAlreadyInactive { id } => {
                write!(f, "particle ID {id} is already inactive")
            }
            Self::FreeListEmpty => write!(f, "inactive ID list is empty"),
            Self::CountMismatch {
                active,
                inactive,
                total,
            } => {
                write!(
                    f,
                    "count mismatch: active {active} + inactive {inactive} != total {total}"
                )
            }
            Self::PassiveArityMismatch { expected, got } => {
                write!(f, "expected {expected} passive values, got {got}")
            }
            Self::LevelOutOfRange { level, n_levels } => {
                write!(f, "level {level} out of range (configured levels: {n_levels})")
            }
            Self::LevelCountUnderflow { level } => {
                write!(f, "active-particle count for level {level} is already zero")
            }
        }
    }
}

impl Error for ConsistencyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_values() {
        let err = ConsistencyError::IdOutOfRange {
            id: ParticleId(7),
            count_total: 3,
        };
        assert_eq!(
            err.to_string(),
            "particle ID 7 out of range (occupied slots: 3)"
        );
    }

    #[test]
    fn config_error_reports_duplicate_name() {
        let err = ConfigError::DuplicatePassiveAttribute {
            name: "metallicity".into(),
        };
        assert!(err.to_string().contains("metallicity"));
    }
}
