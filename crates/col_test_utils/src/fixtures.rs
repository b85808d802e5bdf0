//! Test fixtures and helpers.
//!
//! Pre-built maps and game states for consistent testing.

use col_core::game::Game;
use col_core::map::{Map, TilePos};
use col_core::objects::{Location, ObjectId};
use col_core::ocean::make_fixed_oceans;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// 10x10 water with a 3x3 island in the exact center.
pub const CENTER_ISLAND: &str = "\
~~~~~~~~~~
~~~~~~~~~~
~~~~~~~~~~
~~~~~~~~~~
~~~~###~~~
~~~~###~~~
~~~~###~~~
~~~~~~~~~~
~~~~~~~~~~
~~~~~~~~~~
";

/// A continent splitting west from east, with a north-eastern inlet that
/// reaches below the horizontal midline.
pub const EASTERN_INLET: &str = "\
~~~~~~~~~~~~
~~###~~~~~~~
~~###~~~~~~~
~~###~~~~~~~
~~####~~~~~~
~~####~~~###
~~####~~~###
~~#########~
~~#########~
~~~~~~~~~~~~
";

/// Two land masses joined by an isthmus, with an enclosed lake.
pub const LAKE_AND_ISTHMUS: &str = "\
~~~~~~~~
~####~~~
~#~~#~~~
~####~~~
~~~#~~~~
~~~####~
~~~~~~~~
";

/// Parse an ASCII map.
///
/// # Panics
///
/// Panics if the text is not a valid map.
#[must_use]
pub fn ascii_map(text: &str) -> Map {
    Map::from_ascii(text).expect("fixture map must parse")
}

/// [`CENTER_ISLAND`] without regions.
#[must_use]
pub fn center_island_map() -> Map {
    ascii_map(CENTER_ISLAND)
}

/// [`CENTER_ISLAND`] with the fixed oceans filled.
///
/// # Panics
///
/// Panics if ocean partitioning fails.
#[must_use]
pub fn partitioned_center_island() -> Map {
    let mut map = center_island_map();
    make_fixed_oceans(&mut map).expect("fixture oceans must partition");
    map
}

/// A seeded RNG for reproducible tests.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A small game with one AI player.
#[derive(Debug, Clone)]
pub struct SampleGame {
    /// The game.
    pub game: Game,
    /// The AI player.
    pub player: ObjectId,
    /// Settlement on the island center.
    pub settlement: ObjectId,
    /// Colonist standing in the settlement.
    pub colonist: ObjectId,
    /// Ship in the north-west corner.
    pub ship: ObjectId,
    /// Colonist waiting in Europe.
    pub recruit: ObjectId,
}

/// The partitioned center island with a Dutch settlement in the middle.
///
/// # Panics
///
/// Panics if the fixture cannot be built.
#[must_use]
pub fn sample_game() -> SampleGame {
    let mut game = Game::new(partitioned_center_island());
    let player = game.add_player("Dutch", true);
    let center = TilePos::new(5, 5);
    let settlement = game
        .found_settlement(player, "New Amsterdam", center)
        .expect("center tile is free land");
    let colonist = game
        .spawn_unit(player, Location::Tile(center), false)
        .expect("colonist spawns");
    let ship = game
        .spawn_unit(player, Location::Tile(TilePos::new(0, 0)), true)
        .expect("ship spawns");
    let recruit = game
        .spawn_unit(player, Location::Europe, false)
        .expect("recruit spawns");
    SampleGame {
        game,
        player,
        settlement,
        colonist,
        ship,
        recruit,
    }
}
