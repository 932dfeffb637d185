//! Core types for the Parsec particle storage workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the storage crates: particle
//! and level identifiers, the attribute schema, per-slot lifecycle
//! state, store configuration, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod attr;
pub mod config;
pub mod error;
pub mod id;
pub mod state;

pub use attr::{AttributeLayout, CoreAttr, ParticleInit};
pub use config::{IntegScheme, InterpScheme, StoreConfig};
pub use error::{ConfigError, ConsistencyError};
pub use id::{Level, ParticleId};
pub use state::{InactiveMarker, SlotState};
