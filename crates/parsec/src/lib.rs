//! Parsec: the particle lifecycle and storage core of an adaptive-mesh
//! simulation.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the Parsec sub-crates. For most users, adding `parsec` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use parsec::prelude::*;
//!
//! // An empty store for a cloud-in-cell deposition run.
//! let mut config = StoreConfig::new(0);
//! config.interp = Some(InterpScheme::CloudInCell);
//! let mut store = ParticleStore::new(config).unwrap();
//! assert_eq!(store.ghost_size(), 1);
//!
//! // The caller owns the average-density accumulator; the store only
//! // applies each particle's signed contribution.
//! let inverse_box_volume = 0.5;
//! let mut average_density = 0.0;
//! for mass in [1.0, 2.0, 3.0] {
//!     store
//!         .add_one(
//!             &ParticleInit::with_mass(mass),
//!             &[],
//!             Level(0),
//!             DensityLedger::new(&mut average_density, inverse_box_volume),
//!         )
//!         .unwrap();
//! }
//! assert_eq!(average_density, 3.0);
//!
//! // Removal tombstones the slot and holds its ID for LIFO reuse.
//! store
//!     .remove_one(
//!         ParticleId(1),
//!         InactiveMarker::OutsideDomain,
//!         Some(Level(0)),
//!         Some(DensityLedger::new(&mut average_density, inverse_box_volume)),
//!     )
//!     .unwrap();
//! let reused = store
//!     .add_one(
//!         &ParticleInit::with_mass(4.0),
//!         &[],
//!         Level(0),
//!         DensityLedger::new(&mut average_density, inverse_box_volume),
//!     )
//!     .unwrap();
//! assert_eq!(reused, ParticleId(1));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `parsec-core` | IDs, config, attribute schema, slot state, errors |
//! | [`store`] | `parsec-store` | `ParticleStore`, columns, free list, shared wrapper |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types: IDs, configuration, attribute schema, errors.
pub mod types {
    pub use parsec_core::*;
}

/// Storage: the particle store, columns, free list, shared wrapper.
pub mod store {
    pub use parsec_store::*;
}

/// The types most callers need, in one import.
pub mod prelude {
    pub use parsec_core::{
        AttributeLayout, ConfigError, ConsistencyError, CoreAttr, InactiveMarker, IntegScheme,
        InterpScheme, Level, ParticleId, ParticleInit, SlotState, StoreConfig,
    };
    pub use parsec_store::{
        DensityLedger, GrowthPolicy, ParticleStore, SharedParticleStore,
    };
}
