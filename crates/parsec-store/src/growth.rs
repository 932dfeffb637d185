//! Capacity growth policy for the attribute columns and the free list.

use parsec_core::ConfigError;

/// Growth policy applied when a backing array is full.
///
/// The attribute columns and the inactive-ID list grow on separate
/// triggers and may have different capacities at any time; both use the
/// same policy. There is no shrink — compaction, if ever performed, is
/// an offline operation outside the store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthPolicy {
    factor: f64,
}

impl GrowthPolicy {
    /// Default growth factor.
    pub const DEFAULT_FACTOR: f64 = 1.1;

    /// Create a policy with the given factor.
    ///
    /// Factors below 1.0 are rejected: they would shrink (or never
    /// grow) the target on overflow.
    pub fn new(factor: f64) -> Result<Self, ConfigError> {
        if factor.is_nan() || factor < 1.0 {
            return Err(ConfigError::GrowthFactorTooSmall { factor });
        }
        Ok(Self { factor })
    }

    /// The configured factor.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Next capacity after an overflow at `current`.
    ///
    /// `ceil(factor × (current + 1))` — strictly greater than `current`
    /// for any factor ≥ 1.0, including `current == 0`.
    pub fn grow(&self, current: usize) -> usize {
        (self.factor * (current as f64 + 1.0)).ceil() as usize
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
        }
    }
}
