//! # Colonia Core
//!
//! Deterministic game model for Colonia.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No networking (messages are encoded here, sent elsewhere)
//! - No system randomness (generation takes an explicit seed)
//! - Iteration in id or coordinate order everywhere
//!
//! This separation enables:
//! - An authoritative server that is the single writer of game state
//! - Reproducible map generation and ocean partitioning
//! - Determinism testing through state hashes
//!
//! ## Crate Structure
//!
//! - [`map`] - Tile grid, adjacency, snapshots
//! - [`region`] - Regions and the region registry
//! - [`ocean`] - Partitioning water into the fixed ocean regions
//! - [`objects`] - Object graph with id-based references
//! - [`features`] - Traits attachable to objects
//! - [`game`] - Game state and unit movement
//! - [`protocol`] - Wire messages
//! - [`map_generation`] - Seeded land/water layouts

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod features;
pub mod game;
pub mod map;
pub mod map_generation;
pub mod objects;
pub mod ocean;
pub mod protocol;
pub mod region;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{GameError, Result};
    pub use crate::features::{
        Ability, FeatureSet, HistoryEvent, HistoryEventType, LastSale, ModelMessage, Modifier,
        ModifierType, Trait, TraitKind,
    };
    pub use crate::game::{Game, MoveType};
    pub use crate::map::{Direction, Map, Rect, Tile, TilePos};
    pub use crate::map_generation::{generate_map, MapConfig};
    pub use crate::objects::{GameObject, Location, ObjectGraph, ObjectId};
    pub use crate::ocean::{fill_ocean, make_fixed_oceans, OceanFillReport, Quadrant};
    pub use crate::protocol::{
        FeatureChangeMessage, FeatureChangeOutcome, Message, MessagePriority, WireError,
    };
    pub use crate::region::{Bounds, Region, RegionId, RegionRegistry, RegionType};
}
