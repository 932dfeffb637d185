//! Store configuration and interpolation-scheme policy.
//!
//! [`StoreConfig`] is the builder-input for constructing a particle
//! store. [`validate()`](StoreConfig::validate) checks structural
//! invariants at startup and derives the ghost-zone width from the
//! interpolation scheme. Most fields are carried for external
//! collaborators (the deposition and integration subsystems) and are
//! not interpreted by the store itself.

use crate::error::ConfigError;

/// Mass/acceleration interpolation scheme used by the deposition code.
///
/// The store consults this once, at construction, to size the
/// ghost-zone support each particle needs around its host cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpScheme {
    /// Nearest-grid-point: the particle contributes to its host cell only.
    NearestGridPoint,
    /// Cloud-in-cell: linear weighting over the 2³ surrounding cells.
    CloudInCell,
    /// Triangular-shaped-cloud: quadratic weighting over the 3³
    /// surrounding cells.
    TripleShapedCloud,
}

impl InterpScheme {
    /// Number of ghost cells of support this scheme requires around a
    /// particle's host cell.
    pub fn ghost_width(self) -> u32 {
        match self {
            Self::NearestGridPoint => 0,
            Self::CloudInCell => 1,
            Self::TripleShapedCloud => 1,
        }
    }
}

/// Particle orbit integration scheme.
///
/// Stored for the integrator; the store does not interpret it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegScheme {
    /// First-order Euler update.
    Euler,
    /// Kick-drift-kick leapfrog.
    KickDriftKick,
}

/// Configuration for a particle store.
///
/// Validated once at construction; all values are immutable afterwards.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Number of occupied slots at construction. All are tagged active;
    /// callers populate their attributes through the column views
    /// before the first deposition pass.
    pub initial_count: usize,

    /// Number of mesh refinement levels tracked by the per-level
    /// active-particle counts. Must be at least 1.
    pub n_levels: usize,

    /// Interpolation scheme. Must be set before construction — the
    /// ghost-zone width cannot be derived without it.
    pub interp: Option<InterpScheme>,

    /// Orbit integration scheme (carried for the integrator).
    pub integ: IntegScheme,

    /// Synchronize particles when writing output dumps.
    pub sync_dump: bool,

    /// Improve force accuracy near patch boundaries.
    pub improve_accuracy: bool,

    /// Predict particle positions during mass assignment.
    pub predict_position: bool,

    /// Distance from the domain boundary, in base-level cells, beyond
    /// which particles are removed (non-periodic boundaries only).
    /// `None` disables boundary removal.
    pub remove_cell_threshold: Option<f64>,

    /// Whether to carry per-particle acceleration columns.
    pub store_acceleration: bool,

    /// Names of the passive scalar attributes (e.g. composition
    /// tracers), one dense column each. May be empty.
    pub passive: Vec<String>,
}

impl StoreConfig {
    /// Default refinement depth.
    pub const DEFAULT_LEVELS: usize = 10;

    /// Create a config for the given initial slot count, with defaults
    /// for everything else. The interpolation scheme still has to be
    /// set before the config validates.
    pub fn new(initial_count: usize) -> Self {
        Self {
            initial_count,
            n_levels: Self::DEFAULT_LEVELS,
            interp: None,
            integ: IntegScheme::KickDriftKick,
            sync_dump: true,
            improve_accuracy: true,
            predict_position: true,
            remove_cell_threshold: None,
            store_acceleration: false,
            passive: Vec::new(),
        }
    }

    /// Check structural invariants and derive the ghost-zone width.
    ///
    /// Returns the ghost width on success. Duplicate passive names are
    /// rejected by [`AttributeLayout::new`](crate::AttributeLayout::new),
    /// which owns the name registry.
    pub fn validate(&self) -> Result<u32, ConfigError> {
        if self.n_levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        match self.interp {
            Some(scheme) => Ok(scheme.ghost_width()),
            None => Err(ConfigError::InterpolationUnset),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
