//! The game object graph.
//!
//! Every player, unit and settlement is a [`GameObject`] stored in an
//! [`ObjectGraph`] arena and addressed by a stable [`ObjectId`]. Objects
//! refer to each other by id only, so removing an object never leaves a
//! dangling reference: lookups come back `None` instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::FeatureSet;
use crate::map::TilePos;

/// Unique identifier for game objects.
pub type ObjectId = u64;

/// Where a unit is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// On a map tile.
    Tile(TilePos),
    /// In Europe, off the map.
    Europe,
    /// Carried by another unit.
    Aboard(ObjectId),
}

impl Location {
    /// The map tile, if the location is one.
    #[must_use]
    pub const fn tile(self) -> Option<TilePos> {
        match self {
            Self::Tile(pos) => Some(pos),
            Self::Europe | Self::Aboard(_) => None,
        }
    }
}

/// Player component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Nation name.
    pub name: String,
    /// Whether the server's AI controls this player.
    pub ai: bool,
}

/// Unit component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Owning player.
    pub owner: ObjectId,
    /// Current location.
    pub location: Location,
    /// Moves left this turn.
    pub moves_left: u32,
    /// Moves granted at the start of each turn.
    pub initial_moves: u32,
    /// Ships travel on water, everything else on land.
    pub naval: bool,
}

impl Unit {
    /// A land unit with one move per turn.
    #[must_use]
    pub const fn new(owner: ObjectId, location: Location) -> Self {
        Self {
            owner,
            location,
            moves_left: 1,
            initial_moves: 1,
            naval: false,
        }
    }

    /// The map tile the unit stands on.
    #[must_use]
    pub const fn tile(&self) -> Option<TilePos> {
        self.location.tile()
    }

    /// Whether the unit is on the map.
    #[must_use]
    pub const fn has_tile(&self) -> bool {
        self.tile().is_some()
    }

    /// Whether the unit is in Europe.
    #[must_use]
    pub const fn is_in_europe(&self) -> bool {
        matches!(self.location, Location::Europe)
    }
}

/// Settlement component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settlement {
    /// Owning player.
    pub owner: ObjectId,
    /// Settlement name.
    pub name: String,
    /// Tile of the settlement.
    pub pos: TilePos,
}

/// An object with optional components.
///
/// Only components that are `Some` are active. Every object can carry
/// traits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameObject {
    /// Unique identifier for this object.
    pub id: ObjectId,
    /// Player data.
    pub player: Option<Player>,
    /// Unit data.
    pub unit: Option<Unit>,
    /// Settlement data.
    pub settlement: Option<Settlement>,
    /// Attached traits.
    pub features: FeatureSet,
}

impl GameObject {
    /// Create a new object with no components.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: 0,
            player: None,
            unit: None,
            settlement: None,
            features: FeatureSet::new(),
        }
    }

    /// Attach a player component.
    #[must_use]
    pub fn with_player(mut self, player: Player) -> Self {
        self.player = Some(player);
        self
    }

    /// Attach a unit component.
    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Attach a settlement component.
    #[must_use]
    pub fn with_settlement(mut self, settlement: Settlement) -> Self {
        self.settlement = Some(settlement);
        self
    }
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena of all game objects.
///
/// Backed by a `BTreeMap`, so iteration is in id order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectGraph {
    objects: BTreeMap<ObjectId, GameObject>,
    next_id: ObjectId,
}

impl ObjectGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new object and return its ID.
    pub fn insert(&mut self, mut object: GameObject) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        object.id = id;
        self.objects.insert(id, object);
        id
    }

    /// Remove an object by ID.
    pub fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        self.objects.remove(&id)
    }

    /// Get an object by ID.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// Check if an object exists.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Get the number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object IDs in ascending order.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    /// Iterate over all objects in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    /// Unit component of an object.
    #[must_use]
    pub fn unit(&self, id: ObjectId) -> Option<&Unit> {
        self.get(id)?.unit.as_ref()
    }

    /// Mutable unit component of an object.
    pub fn unit_mut(&mut self, id: ObjectId) -> Option<&mut Unit> {
        self.get_mut(id)?.unit.as_mut()
    }

    /// Settlement component of an object.
    #[must_use]
    pub fn settlement(&self, id: ObjectId) -> Option<&Settlement> {
        self.get(id)?.settlement.as_ref()
    }

    /// Player component of an object.
    #[must_use]
    pub fn player(&self, id: ObjectId) -> Option<&Player> {
        self.get(id)?.player.as_ref()
    }

    /// IDs of all units owned by `owner`, ascending.
    #[must_use]
    pub fn units_of(&self, owner: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.unit.as_ref().is_some_and(|u| u.owner == owner))
            .map(|o| o.id)
            .collect()
    }
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}
