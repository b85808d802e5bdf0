//! Game state: the map, the object graph and the turn counter.
//!
//! All mutation goes through [`Game`] so that the two sides of every
//! cross-reference (tile and settlement, unit and region discovery) stay in
//! step. Iteration is always in object id order, which keeps the state hash
//! reproducible across runs.
//!
//! # Example
//!
//! ```
//! use col_core::game::{Game, MoveType};
//! use col_core::map::{Direction, Map, TilePos};
//! use col_core::objects::Location;
//!
//! let map = Map::from_ascii("~~~\n~##\n~##\n").unwrap();
//! let mut game = Game::new(map);
//! let dutch = game.add_player("Dutch", true);
//! let colonist = game
//!     .spawn_unit(dutch, Location::Tile(TilePos::new(1, 1)), false)
//!     .unwrap();
//!
//! assert_eq!(game.move_unit(colonist, Direction::E).unwrap(), MoveType::Move);
//! assert_eq!(game.move_type(colonist, Direction::S).unwrap(), MoveType::MoveNoMoves);
//! game.new_turn();
//! assert_eq!(game.move_type(colonist, Direction::N).unwrap(), MoveType::MoveNoAccessWater);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::features::{HistoryEvent, HistoryEventType, Trait};
use crate::map::{Direction, Map, TilePos};
use crate::objects::{GameObject, Location, ObjectGraph, ObjectId, Player, Settlement, Unit};

/// Snapshot format version for compatibility.
pub const GAME_FORMAT_VERSION: u32 = 1;

/// Result of asking whether a unit may step in a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveType {
    /// The step is legal.
    Move,
    /// The target is off the map.
    MoveIllegal,
    /// The unit has no moves left this turn.
    MoveNoMoves,
    /// The unit is not on the map.
    MoveNoTile,
    /// A land unit cannot enter water.
    MoveNoAccessWater,
    /// A ship cannot enter land.
    MoveNoAccessLand,
    /// The target holds another player's settlement.
    MoveNoAccessSettlement,
}

impl MoveType {
    /// Whether the step can be taken.
    #[must_use]
    pub const fn is_progress(self) -> bool {
        matches!(self, Self::Move)
    }
}

/// The whole game state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    turn: u32,
    map: Map,
    objects: ObjectGraph,
}

impl Game {
    /// Start a game on `map` at turn 1.
    #[must_use]
    pub fn new(map: Map) -> Self {
        Self {
            turn: 1,
            map,
            objects: ObjectGraph::new(),
        }
    }

    /// Current turn.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// The map.
    #[must_use]
    pub const fn map(&self) -> &Map {
        &self.map
    }

    /// Mutable access to the map.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// The object graph.
    #[must_use]
    pub const fn objects(&self) -> &ObjectGraph {
        &self.objects
    }

    /// Mutable access to the object graph.
    pub fn objects_mut(&mut self) -> &mut ObjectGraph {
        &mut self.objects
    }

    /// Add a player.
    pub fn add_player(&mut self, name: impl Into<String>, ai: bool) -> ObjectId {
        let name = name.into();
        tracing::debug!(name = %name, ai, "Player added");
        self.objects
            .insert(GameObject::new().with_player(Player { name, ai }))
    }

    fn require_player(&self, owner: ObjectId) -> Result<()> {
        self.objects
            .player(owner)
            .map(|_| ())
            .ok_or(GameError::ObjectNotFound(owner))
    }

    fn require_tile(&self, pos: TilePos) -> Result<()> {
        if self.map.in_bounds(pos) {
            Ok(())
        } else {
            Err(GameError::InvalidCoordinate { x: pos.x, y: pos.y })
        }
    }

    /// Create a unit for `owner` at `location`.
    pub fn spawn_unit(&mut self, owner: ObjectId, location: Location, naval: bool) -> Result<ObjectId> {
        self.require_player(owner)?;
        match location {
            Location::Tile(pos) => self.require_tile(pos)?,
            Location::Aboard(carrier) if self.objects.unit(carrier).is_none() => {
                return Err(GameError::ObjectNotFound(carrier));
            }
            Location::Europe | Location::Aboard(_) => {}
        }

        let mut unit = Unit::new(owner, location);
        unit.naval = naval;
        let id = self.objects.insert(GameObject::new().with_unit(unit));
        tracing::debug!(unit = id, owner, ?location, "Unit spawned");
        Ok(id)
    }

    /// Remove a unit from the game.
    pub fn dispose_unit(&mut self, unit: ObjectId) -> Result<()> {
        if self.objects.unit(unit).is_none() {
            return Err(GameError::ObjectNotFound(unit));
        }
        self.objects.remove(unit);
        tracing::debug!(unit, "Unit disposed");
        Ok(())
    }

    /// Found a settlement for `owner` on a free land tile.
    pub fn found_settlement(
        &mut self,
        owner: ObjectId,
        name: impl Into<String>,
        pos: TilePos,
    ) -> Result<ObjectId> {
        self.require_player(owner)?;
        let tile = self
            .map
            .tile(pos)
            .ok_or(GameError::InvalidCoordinate { x: pos.x, y: pos.y })?;
        if !tile.land {
            return Err(GameError::InvalidState(format!(
                "Cannot found a settlement on water at {pos}"
            )));
        }
        if let Some(existing) = tile.settlement {
            return Err(GameError::InvalidState(format!(
                "Tile {pos} already holds settlement {existing}"
            )));
        }

        let name = name.into();
        let id = self.objects.insert(GameObject::new().with_settlement(Settlement {
            owner,
            name: name.clone(),
            pos,
        }));
        if let Some(tile) = self.map.tile_mut(pos) {
            tile.settlement = Some(id);
        }
        tracing::info!(settlement = id, owner, name = %name, %pos, "Settlement founded");
        Ok(id)
    }

    /// The settlement on a tile.
    #[must_use]
    pub fn settlement_at(&self, pos: TilePos) -> Option<ObjectId> {
        self.map.tile(pos)?.settlement
    }

    /// Settlements owned by `owner`, in id order.
    #[must_use]
    pub fn settlements_of(&self, owner: ObjectId) -> Vec<(ObjectId, TilePos)> {
        self.objects
            .iter()
            .filter_map(|o| o.settlement.as_ref().map(|s| (o.id, s)))
            .filter(|(_, s)| s.owner == owner)
            .map(|(id, s)| (id, s.pos))
            .collect()
    }

    /// Classify a one-tile step of `unit` in `direction`.
    pub fn move_type(&self, unit: ObjectId, direction: Direction) -> Result<MoveType> {
        let u = self.objects.unit(unit).ok_or(GameError::ObjectNotFound(unit))?;
        let Some(from) = u.tile() else {
            return Ok(MoveType::MoveNoTile);
        };
        if u.moves_left == 0 {
            return Ok(MoveType::MoveNoMoves);
        }
        let Some(target) = self.map.adjacent(from, direction).and_then(|p| self.map.tile(p))
        else {
            return Ok(MoveType::MoveIllegal);
        };

        if let Some(settlement) = target.settlement {
            let own = self
                .objects
                .settlement(settlement)
                .is_some_and(|s| s.owner == u.owner);
            return Ok(if own {
                MoveType::Move
            } else {
                MoveType::MoveNoAccessSettlement
            });
        }
        Ok(match (u.naval, target.land) {
            (true, true) => MoveType::MoveNoAccessLand,
            (false, false) => MoveType::MoveNoAccessWater,
            _ => MoveType::Move,
        })
    }

    /// Step `unit` one tile in `direction` if the move is legal.
    ///
    /// Returns the classification; the unit only moves on
    /// [`MoveType::Move`]. Entering a region that has not been discovered yet
    /// records the discovery for the unit's owner.
    pub fn move_unit(&mut self, unit: ObjectId, direction: Direction) -> Result<MoveType> {
        let move_type = self.move_type(unit, direction)?;
        if !move_type.is_progress() {
            tracing::trace!(unit, ?direction, ?move_type, "Move refused");
            return Ok(move_type);
        }

        let u = self
            .objects
            .unit_mut(unit)
            .ok_or(GameError::ObjectNotFound(unit))?;
        let target = u
            .tile()
            .and_then(|from| self.map.adjacent(from, direction))
            .ok_or_else(|| GameError::InvalidState(format!("Unit {unit} lost its tile")))?;
        u.location = Location::Tile(target);
        u.moves_left -= 1;
        let owner = u.owner;

        self.discover_at(owner, target)?;
        Ok(move_type)
    }

    fn discover_at(&mut self, owner: ObjectId, pos: TilePos) -> Result<()> {
        let Some(region) = self.map.region_of(pos) else {
            return Ok(());
        };
        let Some(discoverable) = self.map.regions().discoverable_region(region.id().as_str())
        else {
            return Ok(());
        };
        let id = discoverable.id().clone();
        let name_key = discoverable.name_key.clone();

        let discovery = self.map.regions_mut().discover(id.as_str(), owner, self.turn)?;
        if discovery.regions.is_empty() {
            return Ok(());
        }
        tracing::info!(player = owner, region = %id, score = discovery.score, "New region discovered");
        if let Some(player) = self.objects.get_mut(owner) {
            player.features.add(Trait::HistoryEvent(HistoryEvent {
                turn: self.turn,
                event_type: HistoryEventType::DiscoverRegion,
                text: name_key,
                score: i32::try_from(discovery.score).unwrap_or(i32::MAX),
            }));
        }
        Ok(())
    }

    /// Advance to the next turn, restoring every unit's moves.
    pub fn new_turn(&mut self) -> u32 {
        self.turn += 1;
        for id in self.objects.sorted_ids() {
            if let Some(unit) = self.objects.unit_mut(id) {
                unit.moves_left = unit.initial_moves;
            }
        }
        tracing::debug!(turn = self.turn, state_hash = self.state_hash(), "New turn");
        self.turn
    }

    /// Deterministic hash of the full game state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the game to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(&(GAME_FORMAT_VERSION, self))
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize game: {e}")))
    }

    /// Restore a game from [`Game::serialize`] output.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let (version, game): (u32, Self) = bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize game: {e}")))?;
        if version != GAME_FORMAT_VERSION {
            return Err(GameError::InvalidState(format!(
                "Game version mismatch: expected {GAME_FORMAT_VERSION}, got {version}"
            )));
        }
        game.map.check_shape()?;
        Ok(game)
    }
}
