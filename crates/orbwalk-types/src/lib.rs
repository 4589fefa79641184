//! Shared type definitions for the Orbwalk decision core.
//!
//! This crate holds the plain data that flows between the host loop and the
//! arbitration core: positions, identifiers, operating modes, and the
//! per-attempt [`ActionIntent`]. Nothing here carries timing state; that
//! lives in `orbwalk-core`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entities and pipeline listeners
//! - [`geometry`] -- [`Vec3`] and planar distance/angle helpers
//! - [`enums`] -- [`OperatingMode`] and [`ActionKind`]
//! - [`structs`] -- Targets, avatar snapshots, and action intents

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActionKind, OperatingMode, UnknownMode};
pub use geometry::{Vec3, path_length};
pub use ids::{EntityId, ListenerId};
pub use structs::{ActionIntent, AvatarSnapshot, Target, TargetSnapshot};

/// A simulation tick in milliseconds, advanced only by the external clock.
pub type Tick = u64;
