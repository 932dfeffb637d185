//! Attribute schema: core columns, passive registry, and row values.
//!
//! Every particle attribute is one dense column indexed by
//! [`ParticleId`](crate::ParticleId). The schema is sealed at store
//! construction: [`AttributeLayout`] fixes the set of core columns
//! (acceleration is optional) and the ordered passive-attribute name
//! registry, and never changes afterwards.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::config::StoreConfig;
use crate::error::ConfigError;

/// The built-in per-particle attributes.
///
/// The numeric column order is fixed: mass, position, velocity, time,
/// then (when enabled) acceleration. The acceleration variants exist
/// unconditionally; whether they map to a column is decided by the
/// [`AttributeLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoreAttr {
    /// Particle mass. Doubles as the legacy liveness sentinel: inactive
    /// slots carry a negative marker mass in this column.
    Mass,
    /// Position, x component.
    PosX,
    /// Position, y component.
    PosY,
    /// Position, z component.
    PosZ,
    /// Velocity, x component.
    VelX,
    /// Velocity, y component.
    VelY,
    /// Velocity, z component.
    VelZ,
    /// Physical time of the particle's last update.
    Time,
    /// Acceleration, x component (optional column).
    AccX,
    /// Acceleration, y component (optional column).
    AccY,
    /// Acceleration, z component (optional column).
    AccZ,
}

impl CoreAttr {
    /// Column count without acceleration.
    pub const BASE_COUNT: usize = 8;

    /// Column count with acceleration.
    pub const FULL_COUNT: usize = 11;

    /// Column index of this attribute, or `None` for an acceleration
    /// attribute in a layout that does not carry acceleration.
    pub fn column(self, with_acceleration: bool) -> Option<usize> {
        let idx = match self {
            Self::Mass => 0,
            Self::PosX => 1,
            Self::PosY => 2,
            Self::PosZ => 3,
            Self::VelX => 4,
            Self::VelY => 5,
            Self::VelZ => 6,
            Self::Time => 7,
            Self::AccX => 8,
            Self::AccY => 9,
            Self::AccZ => 10,
        };
        if idx >= Self::BASE_COUNT && !with_acceleration {
            return None;
        }
        Some(idx)
    }
}

/// The sealed attribute schema of a store.
///
/// Maps [`CoreAttr`]s and passive attribute names to column indices.
/// Built once from a [`StoreConfig`]; the column count and ordering are
/// immutable for the store's lifetime.
#[derive(Clone, Debug)]
pub struct AttributeLayout {
    with_acceleration: bool,
    /// Passive attribute name → passive column index, insertion-ordered.
    passive: IndexMap<String, usize>,
}

impl AttributeLayout {
    /// Build the layout for a config.
    ///
    /// Rejects duplicate passive attribute names — a silent overwrite
    /// would orphan a column and desynchronize name lookups from
    /// storage.
    pub fn new(config: &StoreConfig) -> Result<Self, ConfigError> {
        let mut passive = IndexMap::with_capacity(config.passive.len());
        for (column, name) in config.passive.iter().enumerate() {
            if passive.insert(name.clone(), column).is_some() {
                return Err(ConfigError::DuplicatePassiveAttribute { name: name.clone() });
            }
        }
        Ok(Self {
            with_acceleration: config.store_acceleration,
            passive,
        })
    }

    /// Whether acceleration columns are present.
    pub fn with_acceleration(&self) -> bool {
        self.with_acceleration
    }

    /// Number of core columns (8, or 11 with acceleration).
    pub fn core_count(&self) -> usize {
        if self.with_acceleration {
            CoreAttr::FULL_COUNT
        } else {
            CoreAttr::BASE_COUNT
        }
    }

    /// Number of passive columns.
    pub fn passive_count(&self) -> usize {
        self.passive.len()
    }

    /// Column index of a core attribute, if present in this layout.
    pub fn column(&self, attr: CoreAttr) -> Option<usize> {
        attr.column(self.with_acceleration)
    }

    /// Passive column index for a name.
    pub fn passive_column(&self, name: &str) -> Option<usize> {
        self.passive.get(name).copied()
    }

    /// Iterate over passive attribute names in column order.
    pub fn passive_names(&self) -> impl Iterator<Item = &str> {
        self.passive.keys().map(String::as_str)
    }
}

/// Initial attribute values for one particle.
///
/// Passed by reference into the add path, which flattens it into the
/// store's column order. Acceleration is ignored by layouts without
/// acceleration columns and defaults to zero when the layout has them
/// but no value is supplied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleInit {
    /// Particle mass. Physically valid masses are non-negative.
    pub mass: f64,
    /// Position (x, y, z).
    pub position: [f64; 3],
    /// Velocity (x, y, z).
    pub velocity: [f64; 3],
    /// Physical time.
    pub time: f64,
    /// Acceleration (x, y, z), if tracked.
    pub acceleration: Option<[f64; 3]>,
}

impl ParticleInit {
    /// A particle at rest at the origin with the given mass.
    pub fn with_mass(mass: f64) -> Self {
        Self {
            mass,
            position: [0.0; 3],
            velocity: [0.0; 3],
            time: 0.0,
            acceleration: None,
        }
    }

    /// Flatten into the layout's core column order.
    ///
    /// The returned row has exactly `layout.core_count()` entries.
    /// `SmallVec` keeps the row on the stack for every layout arity.
    pub fn flatten(&self, layout: &AttributeLayout) -> SmallVec<[f64; CoreAttr::FULL_COUNT]> {
        let mut row = SmallVec::new();
        row.push(self.mass);
        row.extend_from_slice(&self.position);
        row.extend_from_slice(&self.velocity);
        row.push(self.time);
        if layout.with_acceleration() {
            row.extend_from_slice(&self.acceleration.unwrap_or([0.0; 3]));
        }
        row
    }
}
