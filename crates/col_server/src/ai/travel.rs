//! Movement helpers shared by missions.

use col_core::error::{GameError, Result};
use col_core::game::{Game, MoveType};
use col_core::map::{Direction, Map, Tile, TilePos};
use col_core::objects::{ObjectGraph, ObjectId};
use rand::Rng;

/// The direction that leads from `from` to the adjacent tile `to`.
#[must_use]
pub fn direction_between(map: &Map, from: TilePos, to: TilePos) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|&d| map.adjacent(from, d) == Some(to))
}

/// Move `unit` along the shortest path to `dest` until it arrives or stops.
///
/// The path is recomputed before every step, since earlier steps can
/// change what is passable. Returns the last move classification:
/// [`MoveType::Move`] once the unit stands on `dest`, otherwise the reason
/// it stopped. An unreachable destination reports
/// [`MoveType::MoveIllegal`].
pub fn travel_to_target<F>(
    game: &mut Game,
    unit: ObjectId,
    dest: TilePos,
    passable: F,
) -> Result<MoveType>
where
    F: Fn(&ObjectGraph, &Tile) -> bool,
{
    loop {
        let Some(from) = game.objects().unit(unit).and_then(|u| u.tile()) else {
            return Ok(MoveType::MoveNoTile);
        };
        if from == dest {
            return Ok(MoveType::Move);
        }

        let objects = game.objects();
        let Some(next) = game
            .map()
            .find_path(from, dest, |tile| passable(objects, tile))
            .and_then(|path| path.first().copied())
        else {
            return Ok(MoveType::MoveIllegal);
        };
        let direction = direction_between(game.map(), from, next).ok_or_else(|| {
            GameError::InvalidState(format!("Path step {from} -> {next} is not adjacent"))
        })?;

        let move_type = game.move_unit(unit, direction)?;
        if !move_type.is_progress() {
            return Ok(move_type);
        }
    }
}

/// Take random legal steps with `unit` until it runs out of moves or is
/// boxed in. Returns the number of steps taken.
pub fn move_randomly_turn<R: Rng>(game: &mut Game, unit: ObjectId, rng: &mut R) -> Result<u32> {
    let mut steps = 0;
    loop {
        let mut legal = Vec::with_capacity(Direction::ALL.len());
        for direction in Direction::ALL {
            match game.move_type(unit, direction)? {
                MoveType::Move => legal.push(direction),
                // Nothing else will succeed this turn.
                MoveType::MoveNoMoves | MoveType::MoveNoTile => return Ok(steps),
                _ => {}
            }
        }
        if legal.is_empty() {
            return Ok(steps);
        }

        let direction = legal[rng.gen_range(0..legal.len())];
        game.move_unit(unit, direction)?;
        steps += 1;
    }
}
