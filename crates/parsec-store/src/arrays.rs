//! Parallel dense attribute columns.
//!
//! [`AttributeArrays`] owns one `Vec<f64>` per core and passive
//! attribute, all of identical logical capacity, indexed by
//! [`ParticleId`]. Columns are contiguous so the deposition and
//! integration subsystems can consume them with vectorized sweeps.
//!
//! Growth reallocates every column; any slice previously obtained from
//! an accessor refers to the old allocation's contents and must be
//! re-fetched. Indices are stable — only addresses move.

use parsec_core::{AttributeLayout, CoreAttr, ParticleId, ParticleInit};

/// Parallel column storage for all particle attributes.
pub struct AttributeArrays {
    layout: AttributeLayout,
    capacity: usize,
    /// Core columns in [`CoreAttr`] order.
    core: Vec<Vec<f64>>,
    /// Passive columns in registry order.
    passive: Vec<Vec<f64>>,
}

impl AttributeArrays {
    /// Allocate all columns at the given capacity, zero-initialised.
    pub fn new(layout: AttributeLayout, capacity: usize) -> Self {
        let core = (0..layout.core_count())
            .map(|_| vec![0.0; capacity])
            .collect();
        let passive = (0..layout.passive_count())
            .map(|_| vec![0.0; capacity])
            .collect();
        Self {
            layout,
            capacity,
            core,
            passive,
        }
    }

    /// The attribute schema.
    pub fn layout(&self) -> &AttributeLayout {
        &self.layout
    }

    /// Logical capacity of every column.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reallocate every column to `new_capacity`.
    ///
    /// Contents at indices below `min(capacity, new_capacity)` are
    /// preserved; new slots are zero-filled. The lifecycle layer only
    /// ever grows, but the operation itself is direction-agnostic.
    pub fn resize(&mut self, new_capacity: usize) {
        for column in self.core.iter_mut().chain(self.passive.iter_mut()) {
            column.resize(new_capacity, 0.0);
        }
        self.capacity = new_capacity;
    }

    /// View of a core attribute column.
    ///
    /// `None` for an acceleration attribute when the layout does not
    /// carry acceleration.
    pub fn column(&self, attr: CoreAttr) -> Option<&[f64]> {
        let idx = self.layout.column(attr)?;
        Some(&self.core[idx])
    }

    /// Mutable view of a core attribute column.
    pub fn column_mut(&mut self, attr: CoreAttr) -> Option<&mut [f64]> {
        let idx = self.layout.column(attr)?;
        Some(&mut self.core[idx])
    }

    /// View of the mass column. Always present.
    pub fn mass(&self) -> &[f64] {
        &self.core[0]
    }

    /// Mutable view of the mass column.
    pub fn mass_mut(&mut self) -> &mut [f64] {
        &mut self.core[0]
    }

    /// View of a passive column by registry index.
    pub fn passive(&self, column: usize) -> Option<&[f64]> {
        self.passive.get(column).map(Vec::as_slice)
    }

    /// Mutable view of a passive column by registry index.
    pub fn passive_mut(&mut self, column: usize) -> Option<&mut [f64]> {
        self.passive.get_mut(column).map(Vec::as_mut_slice)
    }

    /// Write one particle's core row and passive values at `id`.
    ///
    /// `passive_values` must have exactly one entry per passive column;
    /// the lifecycle layer validates arity before calling.
    pub fn write_row(&mut self, id: ParticleId, init: &ParticleInit, passive_values: &[f64]) {
        let idx = id.index();
        let row = init.flatten(&self.layout);
        for (column, value) in self.core.iter_mut().zip(row) {
            column[idx] = value;
        }
        for (column, &value) in self.passive.iter_mut().zip(passive_values) {
            column[idx] = value;
        }
    }

    /// Memory footprint of all columns in bytes.
    pub fn memory_bytes(&self) -> usize {
        let columns = self.core.len() + self.passive.len();
        columns * self.capacity * std::mem::size_of::<f64>()
    }
}
