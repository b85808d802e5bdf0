//! Unit missions.
//!
//! A mission is stepped once per turn for its unit and answers either
//! [`MissionStep::Continue`] (run again next turn) or
//! [`MissionStep::Complete`] (the controller drops it).
//!
//! The idle-at-settlement mission moves through these states each turn:
//! - Off the map (in Europe or aboard a carrier): wait for next turn
//! - Standing on a settlement: idle in place, no move issued
//! - A friendly settlement is reachable: travel towards it
//! - Nothing reachable: wander randomly until out of moves

use col_core::error::Result;
use col_core::game::{Game, MoveType};
use col_core::map::{Tile, TilePos};
use col_core::objects::{Location, ObjectGraph, ObjectId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::travel::{move_randomly_turn, travel_to_target};

/// What a mission does with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionKind {
    /// Stay in or head to the nearest friendly settlement.
    IdleAtSettlement,
    /// Move randomly every turn.
    Wander,
}

/// Result of stepping a mission for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionStep {
    /// Keep the mission for next turn.
    Continue,
    /// The mission is over and should be removed.
    Complete,
}

/// Why a mission can no longer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidReason {
    /// The unit no longer exists.
    #[error("unit is gone")]
    UnitMissing,
    /// The unit's owner no longer exists.
    #[error("owner is gone")]
    NoOwner,
    /// The owner is not controlled by the AI.
    #[error("owner is not AI controlled")]
    NotAiControlled,
}

/// A mission bound to one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    unit: ObjectId,
    kind: MissionKind,
    target: Option<Location>,
}

impl Mission {
    /// Idle at (or return to) a friendly settlement.
    #[must_use]
    pub const fn idle_at_settlement(unit: ObjectId) -> Self {
        Self {
            unit,
            kind: MissionKind::IdleAtSettlement,
            target: None,
        }
    }

    /// Wander randomly.
    #[must_use]
    pub const fn wander(unit: ObjectId) -> Self {
        Self {
            unit,
            kind: MissionKind::Wander,
            target: None,
        }
    }

    /// The unit this mission drives.
    #[must_use]
    pub const fn unit(&self) -> ObjectId {
        self.unit
    }

    /// The mission kind.
    #[must_use]
    pub const fn kind(&self) -> MissionKind {
        self.kind
    }

    /// The target chosen on the last step.
    #[must_use]
    pub const fn target(&self) -> Option<Location> {
        self.target
    }

    /// Whether another mission may replace this one at any time.
    #[must_use]
    pub const fn is_one_time(&self) -> bool {
        matches!(self.kind, MissionKind::IdleAtSettlement)
    }

    /// Why the mission cannot run, or `None` when it can.
    #[must_use]
    pub fn invalid_reason(&self, game: &Game) -> Option<InvalidReason> {
        let Some(unit) = game.objects().unit(self.unit) else {
            return Some(InvalidReason::UnitMissing);
        };
        match game.objects().player(unit.owner) {
            None => Some(InvalidReason::NoOwner),
            Some(player) if !player.ai => Some(InvalidReason::NotAiControlled),
            Some(_) => None,
        }
    }

    /// Where the unit should go.
    ///
    /// A unit off the map keeps its current location. A unit on the map
    /// heads for the nearest reachable friendly settlement other than the
    /// one it stands on.
    #[must_use]
    pub fn find_target(&self, game: &Game) -> Option<Location> {
        let unit = game.objects().unit(self.unit)?;
        let Some(from) = unit.tile() else {
            return Some(unit.location);
        };
        if self.kind == MissionKind::Wander {
            return None;
        }

        let (owner, naval) = (unit.owner, unit.naval);
        let objects = game.objects();
        game.settlements_of(owner)
            .into_iter()
            .filter(|&(_, pos)| pos != from)
            .filter_map(|(_, pos)| {
                game.map()
                    .find_path(from, pos, |tile| passable(objects, owner, naval, tile))
                    .map(|path| (path.len(), pos))
            })
            .min_by_key(|&(len, _)| len)
            .map(|(_, pos)| Location::Tile(pos))
    }

    /// Run one turn of the mission.
    pub fn step<R: Rng>(&mut self, game: &mut Game, rng: &mut R) -> Result<MissionStep> {
        if let Some(reason) = self.invalid_reason(game) {
            tracing::debug!(unit = self.unit, kind = ?self.kind, %reason, "Mission invalid");
            return Ok(MissionStep::Complete);
        }
        let Some(pos) = game.objects().unit(self.unit).and_then(|u| u.tile()) else {
            return Ok(MissionStep::Continue);
        };

        match self.kind {
            MissionKind::IdleAtSettlement => self.idle(game, rng, pos),
            MissionKind::Wander => {
                move_randomly_turn(game, self.unit, rng)?;
                Ok(MissionStep::Continue)
            }
        }
    }

    fn idle<R: Rng>(&mut self, game: &mut Game, rng: &mut R, pos: TilePos) -> Result<MissionStep> {
        if game.settlement_at(pos).is_some() {
            self.target = Some(Location::Tile(pos));
            tracing::trace!(unit = self.unit, %pos, "Idling in settlement");
            return Ok(MissionStep::Continue);
        }

        self.target = self.find_target(game);
        let Some(Location::Tile(dest)) = self.target else {
            let steps = move_randomly_turn(game, self.unit, rng)?;
            tracing::trace!(unit = self.unit, steps, "No settlement in reach, wandering");
            return Ok(MissionStep::Continue);
        };

        let (owner, naval) = match game.objects().unit(self.unit) {
            Some(unit) => (unit.owner, unit.naval),
            None => return Ok(MissionStep::Complete),
        };
        let move_type = travel_to_target(game, self.unit, dest, move |objects, tile| {
            passable(objects, owner, naval, tile)
        })?;
        match move_type {
            MoveType::Move | MoveType::MoveIllegal | MoveType::MoveNoMoves | MoveType::MoveNoTile => {}
            blocked => {
                tracing::debug!(unit = self.unit, %dest, move_type = ?blocked, "Travel blocked");
            }
        }
        Ok(MissionStep::Continue)
    }
}

/// Whether a unit of `owner` may path through `tile`.
///
/// Friendly settlements are open to land and naval units alike.
fn passable(objects: &ObjectGraph, owner: ObjectId, naval: bool, tile: &Tile) -> bool {
    if let Some(settlement) = tile.settlement {
        return objects
            .settlement(settlement)
            .is_some_and(|s| s.owner == owner);
    }
    tile.land != naval
}

#[cfg(test)]
mod tests {
    use super::*;
    use col_core::map::Map;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn strip() -> (Game, ObjectId) {
        let map = Map::from_ascii("~~~~~~\n~####~\n~~~~~~\n").unwrap();
        let mut game = Game::new(map);
        let player = game.add_player("Dutch", true);
        (game, player)
    }

    #[test]
    fn test_invalid_reasons() {
        let (mut game, ai) = strip();
        let human = game.add_player("English", false);
        let mine = game.spawn_unit(ai, Location::Europe, false).unwrap();
        let theirs = game.spawn_unit(human, Location::Europe, false).unwrap();

        assert_eq!(Mission::idle_at_settlement(mine).invalid_reason(&game), None);
        assert_eq!(
            Mission::idle_at_settlement(theirs).invalid_reason(&game),
            Some(InvalidReason::NotAiControlled)
        );
        assert_eq!(
            Mission::idle_at_settlement(99).invalid_reason(&game),
            Some(InvalidReason::UnitMissing)
        );

        game.objects_mut().remove(ai);
        assert_eq!(
            Mission::idle_at_settlement(mine).invalid_reason(&game),
            Some(InvalidReason::NoOwner)
        );
    }

    #[test]
    fn test_off_map_unit_waits() {
        let (mut game, ai) = strip();
        let unit = game.spawn_unit(ai, Location::Europe, false).unwrap();
        let mut mission = Mission::idle_at_settlement(unit);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let before = game.state_hash();
        assert_eq!(mission.step(&mut game, &mut rng).unwrap(), MissionStep::Continue);
        assert_eq!(game.state_hash(), before);
        assert_eq!(mission.find_target(&game), Some(Location::Europe));
    }

    #[test]
    fn test_travels_to_settlement() {
        let (mut game, ai) = strip();
        game.found_settlement(ai, "Fort Orange", TilePos::new(4, 1)).unwrap();
        let unit = game
            .spawn_unit(ai, Location::Tile(TilePos::new(1, 1)), false)
            .unwrap();
        let mut mission = Mission::idle_at_settlement(unit);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..3 {
            assert_eq!(mission.step(&mut game, &mut rng).unwrap(), MissionStep::Continue);
            game.new_turn();
        }
        assert_eq!(mission.target(), Some(Location::Tile(TilePos::new(4, 1))));
        assert_eq!(
            game.objects().unit(unit).unwrap().tile(),
            Some(TilePos::new(4, 1))
        );

        // Arrived: stays put from now on.
        let before = game.state_hash();
        mission.step(&mut game, &mut rng).unwrap();
        assert_eq!(game.state_hash(), before);
    }

    #[test]
    fn test_foreign_settlement_is_not_a_target() {
        let (mut game, ai) = strip();
        let rival = game.add_player("French", true);
        game.found_settlement(rival, "Quebec", TilePos::new(4, 1)).unwrap();
        let unit = game
            .spawn_unit(ai, Location::Tile(TilePos::new(1, 1)), false)
            .unwrap();
        assert_eq!(Mission::idle_at_settlement(unit).find_target(&game), None);
    }

    #[test]
    fn test_wander_is_not_one_time() {
        assert!(Mission::idle_at_settlement(1).is_one_time());
        assert!(!Mission::wander(1).is_one_time());
    }
}
