//! Procedural map generation.
//!
//! Produces a land/water layout from a seed:
//! - Continents grown by random walks from random starting tiles
//! - A water margin along every edge, so each map edge has ocean
//! - The fixed ocean regions filled in afterwards by [`generate_map`]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::map::{Direction, Map, TilePos};
use crate::ocean::make_fixed_oceans;

/// Map configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Share of the interior that becomes land (0.0 = all water).
    pub land_density: f32,
    /// Width of the all-water band along each edge.
    pub water_margin: u32,
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 100,
            land_density: 0.35,
            water_margin: 2,
            seed: 12345,
        }
    }
}

impl MapConfig {
    /// A small map for quick games and tests.
    #[must_use]
    pub fn small() -> Self {
        Self {
            width: 20,
            height: 40,
            ..Default::default()
        }
    }

    /// The standard map size.
    #[must_use]
    pub fn medium() -> Self {
        Self::default()
    }

    /// A large map.
    #[must_use]
    pub fn large() -> Self {
        Self {
            width: 60,
            height: 150,
            ..Default::default()
        }
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set land density.
    #[must_use]
    pub fn with_land_density(mut self, density: f32) -> Self {
        self.land_density = density.clamp(0.0, 1.0);
        self
    }

    fn interior(&self) -> Option<(u32, u32, u32, u32)> {
        let m = self.water_margin;
        (self.width > 2 * m && self.height > 2 * m)
            .then(|| (m, m, self.width - m, self.height - m))
    }
}

/// Generate the land and water layout. No regions are created.
///
/// Fails if `width` or `height` is zero.
pub fn generate_land(config: &MapConfig) -> Result<Map> {
    let mut map = Map::try_new(config.width, config.height)?;
    let Some((x0, y0, x1, y1)) = config.interior() else {
        return Ok(map);
    };

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let interior = ((x1 - x0) * (y1 - y0)) as usize;
    let target = (interior as f32 * config.land_density.clamp(0.0, 1.0)).round() as usize;
    let mut land = 0usize;
    let mut attempts = 0usize;

    while land < target && attempts < interior * 4 {
        attempts += 1;
        let mut pos = TilePos::new(rng.gen_range(x0..x1), rng.gen_range(y0..y1));
        let walk = rng.gen_range(4..=(interior / 8).max(8));

        for _ in 0..walk {
            if land >= target {
                break;
            }
            if !map.is_land(pos) {
                // Interior positions are always on the map.
                if map.set_land(pos, true).is_ok() {
                    land += 1;
                }
            }
            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            if let Some(next) = map.adjacent(pos, direction) {
                if (x0..x1).contains(&next.x) && (y0..y1).contains(&next.y) {
                    pos = next;
                }
            }
        }
    }

    tracing::debug!(
        width = config.width,
        height = config.height,
        seed = config.seed,
        land,
        "Land generated"
    );
    Ok(map)
}

/// Generate a map and partition its water into the fixed oceans.
pub fn generate_map(config: &MapConfig) -> Result<Map> {
    let mut map = generate_land(config)?;
    make_fixed_oceans(&mut map)?;
    Ok(map)
}
