//! Partitioning of the map's water into the six fixed ocean regions.
//!
//! The Pacific and the Atlantic each have a north and a south child. A seed
//! water tile is found on the west (Pacific) and east (Atlantic) map edge of
//! each half, then the four children are flood filled in three widening
//! passes:
//!
//! 1. each child within its own quadrant,
//! 2. each child within its own (north or south) half,
//! 3. each child across the whole map.
//!
//! All four children run pass 1 before any runs pass 2, and so on. A fill
//! only absorbs water that is unassigned or already its own, so a child
//! keeps its quadrant unless the earlier passes left tiles unreached. That
//! ordering handles oceans that reach across the nominal quadrant lines:
//!
//! ```text
//!   NP NP NP NA NA NA      NP NP NP NA NA NA
//!   NP L  L  L  L  NA      NP L  L  NA L  NA
//!   NP L  NA NA NA NA  or  NP L  NA NA L  NA
//!   SP L  SA SA SA SA      SP L  NA L  L  SA
//!   SP L  L  L  L  SA      SP L  L  L  L  SA
//!   SP SP SP SA SA SA      SP SP SP SA SA SA
//! ```

use std::collections::VecDeque;

use crate::error::Result;
use crate::map::{Map, Rect, TilePos};
use crate::region::{Region, RegionId, RegionType};

/// The Pacific.
pub const PACIFIC: &str = "model.region.pacific";
/// The North Pacific, child of [`PACIFIC`].
pub const NORTH_PACIFIC: &str = "model.region.northPacific";
/// The South Pacific, child of [`PACIFIC`].
pub const SOUTH_PACIFIC: &str = "model.region.southPacific";
/// The Atlantic.
pub const ATLANTIC: &str = "model.region.atlantic";
/// The North Atlantic, child of [`ATLANTIC`].
pub const NORTH_ATLANTIC: &str = "model.region.northAtlantic";
/// The South Atlantic, child of [`ATLANTIC`].
pub const SOUTH_ATLANTIC: &str = "model.region.southAtlantic";

/// Score for being first to discover the Pacific.
pub const PACIFIC_SCORE_VALUE: u32 = 100;

/// The six fixed ocean region ids, parents first.
pub const FIXED_OCEANS: [&str; 6] = [
    PACIFIC,
    ATLANTIC,
    NORTH_PACIFIC,
    SOUTH_PACIFIC,
    NORTH_ATLANTIC,
    SOUTH_ATLANTIC,
];

/// The four quadrant oceans, in fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// North Pacific (north-west).
    NorthPacific,
    /// South Pacific (south-west).
    SouthPacific,
    /// North Atlantic (north-east).
    NorthAtlantic,
    /// South Atlantic (south-east).
    SouthAtlantic,
}

impl Quadrant {
    /// Fill order within each pass.
    pub const ALL: [Self; 4] = [
        Self::NorthPacific,
        Self::SouthPacific,
        Self::NorthAtlantic,
        Self::SouthAtlantic,
    ];

    /// Region id filled from this quadrant.
    #[must_use]
    pub const fn region_id(self) -> &'static str {
        match self {
            Self::NorthPacific => NORTH_PACIFIC,
            Self::SouthPacific => SOUTH_PACIFIC,
            Self::NorthAtlantic => NORTH_ATLANTIC,
            Self::SouthAtlantic => SOUTH_ATLANTIC,
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NorthPacific => "North Pacific",
            Self::SouthPacific => "South Pacific",
            Self::NorthAtlantic => "North Atlantic",
            Self::SouthAtlantic => "South Atlantic",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    const fn is_north(self) -> bool {
        matches!(self, Self::NorthPacific | Self::NorthAtlantic)
    }

    const fn is_pacific(self) -> bool {
        matches!(self, Self::NorthPacific | Self::SouthPacific)
    }

    /// The quadrant rectangle of a `width` x `height` map.
    #[must_use]
    pub const fn quadrant_rect(self, width: u32, height: u32) -> Rect {
        let (mid_x, mid_y) = (width / 2, height / 2);
        let (x, w) = if self.is_pacific() {
            (0, mid_x)
        } else {
            (mid_x, width - mid_x)
        };
        let (y, h) = if self.is_north() {
            (0, mid_y)
        } else {
            (mid_y, height - mid_y)
        };
        Rect::new(x, y, w, h)
    }

    /// The north or south half containing the quadrant.
    #[must_use]
    pub const fn half_rect(self, width: u32, height: u32) -> Rect {
        let mid_y = height / 2;
        if self.is_north() {
            Rect::new(0, 0, width, mid_y)
        } else {
            Rect::new(0, mid_y, width, height - mid_y)
        }
    }
}

/// Seed tiles for the four quadrant oceans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OceanSeeds {
    seeds: [Option<TilePos>; 4],
}

impl OceanSeeds {
    /// Seed of a quadrant, if water was found.
    #[must_use]
    pub const fn get(&self, quadrant: Quadrant) -> Option<TilePos> {
        self.seeds[quadrant.index()]
    }
}

/// Tiles absorbed per quadrant ocean by one [`make_fixed_oceans`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OceanFillReport {
    /// Regions that were missing and got created.
    pub created: Vec<RegionId>,
    filled: [usize; 4],
}

impl OceanFillReport {
    /// Tiles newly absorbed into a quadrant ocean.
    #[must_use]
    pub const fn filled(&self, quadrant: Quadrant) -> usize {
        self.filled[quadrant.index()]
    }

    /// Tiles newly absorbed into all four quadrant oceans.
    #[must_use]
    pub fn total(&self) -> usize {
        self.filled.iter().sum()
    }
}

/// Find the seed water tile of each quadrant.
///
/// The north pair scans rows from just above the horizontal midline up to
/// the top edge; the south pair scans from the midline down to the bottom
/// edge. In each row the west column seeds the Pacific and the east column
/// seeds the Atlantic. Scanning of a pair stops once both are found.
#[must_use]
pub fn find_ocean_seeds(map: &Map) -> OceanSeeds {
    let max_x = map.width() - 1;
    let mid_y = map.height() / 2;
    let water = |x: u32, y: u32| {
        let pos = TilePos::new(x, y);
        (!map.is_land(pos)).then_some(pos)
    };

    let mut seeds = OceanSeeds::default();
    let mut scan = |rows: &mut dyn Iterator<Item = u32>, pacific: Quadrant, atlantic: Quadrant| {
        for y in rows {
            if seeds.seeds[pacific.index()].is_none() {
                seeds.seeds[pacific.index()] = water(0, y);
            }
            if seeds.seeds[atlantic.index()].is_none() {
                seeds.seeds[atlantic.index()] = water(max_x, y);
            }
            if seeds.seeds[pacific.index()].is_some() && seeds.seeds[atlantic.index()].is_some() {
                break;
            }
        }
    };
    scan(
        &mut (0..mid_y).rev(),
        Quadrant::NorthPacific,
        Quadrant::NorthAtlantic,
    );
    scan(
        &mut (mid_y..map.height()),
        Quadrant::SouthPacific,
        Quadrant::SouthAtlantic,
    );
    seeds
}

/// Flood fill a region from `seed`, staying inside `bounds`.
///
/// Breadth-first over the map's adjacency. A tile is taken when it lies in
/// `bounds`, is water, and is unassigned or already in `region`. Each call
/// uses a fresh visited set, so tiles absorbed by an earlier call are
/// crossed again (without being counted) and the fill can push past them.
///
/// Returns the number of tiles newly added to the region.
pub fn fill_ocean(map: &mut Map, seed: TilePos, region: &RegionId, bounds: Rect) -> Result<usize> {
    let eligible = |map: &Map, pos: TilePos| {
        map.tile(pos).is_some_and(|t| {
            !t.land && t.region.as_ref().map_or(true, |r| r == region)
        })
    };
    if !bounds.contains(seed) || !eligible(map, seed) {
        return Ok(0);
    }

    let width = map.width() as usize;
    let mut visited = vec![false; width * map.height() as usize];
    let index = |pos: TilePos| pos.y as usize * width + pos.x as usize;
    let mut queue = VecDeque::new();
    let mut filled = 0;

    visited[index(seed)] = true;
    queue.push_back(seed);
    while let Some(pos) = queue.pop_front() {
        if map.add_tile_to_region(pos, region)? {
            filled += 1;
        }
        for next in map.neighbours(pos).collect::<Vec<_>>() {
            if visited[index(next)] || !bounds.contains(next) {
                continue;
            }
            visited[index(next)] = true;
            if eligible(map, next) {
                queue.push_back(next);
            }
        }
    }
    Ok(filled)
}

/// Create the fixed ocean regions if any is missing and fill them.
///
/// Does nothing and returns `Ok(None)` if all six already exist. Otherwise
/// the missing regions are created and the three-pass fill is run; regions
/// that end up without tiles are reported, not treated as errors.
pub fn make_fixed_oceans(map: &mut Map) -> Result<Option<OceanFillReport>> {
    if FIXED_OCEANS.iter().all(|id| map.regions().contains(id)) {
        return Ok(None);
    }

    let mut report = OceanFillReport::default();
    for region in fixed_ocean_templates() {
        if !map.regions().contains(region.id().as_str()) {
            let id = region.id().clone();
            map.regions_mut().insert(region)?;
            // Tiles may still point at a region of the same id.
            map.recount_region(id.as_str())?;
            report.created.push(id);
        }
    }

    let seeds = find_ocean_seeds(map);
    for quadrant in Quadrant::ALL {
        if seeds.get(quadrant).is_none() {
            tracing::warn!(region = quadrant.region_id(), "No seed tile found");
        }
    }

    let (width, height) = (map.width(), map.height());
    let passes: [(&str, fn(Quadrant, u32, u32) -> Rect); 3] = [
        ("quadrant", Quadrant::quadrant_rect),
        ("half", Quadrant::half_rect),
        ("map", |_, w, h| Rect::new(0, 0, w, h)),
    ];
    for (pass, rect_of) in passes {
        for quadrant in Quadrant::ALL {
            let Some(seed) = seeds.get(quadrant) else {
                continue;
            };
            let id = RegionId::new(quadrant.region_id());
            let n = fill_ocean(map, seed, &id, rect_of(quadrant, width, height))?;
            report.filled[quadrant.index()] += n;
            tracing::debug!(pass, region = quadrant.region_id(), filled = n, "Ocean fill pass");
        }
        #[cfg(feature = "debug-validation")]
        for quadrant in Quadrant::ALL {
            map.check_region(quadrant.region_id())?;
        }
    }

    for quadrant in Quadrant::ALL {
        if report.filled(quadrant) == 0 {
            tracing::warn!(region = quadrant.region_id(), "No {} tiles found", quadrant.label());
        }
    }
    tracing::info!(
        north_pacific = report.filled(Quadrant::NorthPacific),
        south_pacific = report.filled(Quadrant::SouthPacific),
        north_atlantic = report.filled(Quadrant::NorthAtlantic),
        south_atlantic = report.filled(Quadrant::SouthAtlantic),
        "Ocean regions complete"
    );
    Ok(Some(report))
}

fn fixed_ocean_templates() -> [Region; 6] {
    let child = |id: &str, parent: &str| {
        Region::new(id, RegionType::Ocean, Some(RegionId::new(parent))).with_discoverable(false)
    };
    [
        Region::new(PACIFIC, RegionType::Ocean, None)
            .with_discoverable(true)
            .with_score_value(PACIFIC_SCORE_VALUE),
        Region::new(ATLANTIC, RegionType::Ocean, None)
            .with_prediscovered(true)
            .with_discoverable(false),
        child(NORTH_PACIFIC, PACIFIC),
        child(SOUTH_PACIFIC, PACIFIC),
        child(NORTH_ATLANTIC, ATLANTIC).with_prediscovered(true),
        child(SOUTH_ATLANTIC, ATLANTIC).with_prediscovered(true),
    ]
}
