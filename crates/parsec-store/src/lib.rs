//! Dense particle attribute storage and lifecycle management.
//!
//! This crate owns the per-rank particle container of a Parsec
//! simulation: contiguous per-attribute columns sized for bulk
//! consumption by the deposition and integration subsystems, plus the
//! add/remove/reuse protocol that keeps them dense under churn.
//!
//! # Architecture
//!
//! ```text
//! ParticleStore (lifecycle orchestrator)
//! ├── AttributeArrays (one Vec<f64> column per attribute)
//! ├── InactiveIdRegistry (LIFO pool of reusable slot IDs)
//! ├── GrowthPolicy (ceil(1.1 × (capacity + 1)) on overflow)
//! └── counters (total / active / inactive / per-level)
//! ```
//!
//! Removal never frees a slot: the slot is tombstoned, its ID pushed
//! onto the free list, and the next add reuses it (LIFO). Backing
//! columns only ever grow, and growth preserves all existing contents
//! at their indices.
//!
//! # View invalidation
//!
//! Column views borrow the store, so the borrow checker already forbids
//! holding one across an add/remove. The contract matters across
//! lock releases instead: with a [`SharedParticleStore`], any slice
//! fetched under a previous lock must be re-fetched after another
//! thread may have mutated the store, because growth reallocates every
//! column.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arrays;
pub mod growth;
pub mod registry;
pub mod shared;
pub mod store;

pub use arrays::AttributeArrays;
pub use growth::GrowthPolicy;
pub use registry::InactiveIdRegistry;
pub use shared::SharedParticleStore;
pub use store::{DensityLedger, ParticleStore};
