//! Region validation.
//!
//! Checks a partitioned map against the region invariants:
//! - Every region's stored size equals the number of tiles pointing at it
//! - Every region's stored bounds are the minimal cover of those tiles
//! - Every parent a region names exists
//! - Every tile points at a registered region
//! - Every water tile connected to an ocean seed belongs to a region

use std::collections::VecDeque;
use std::fmt;

use col_core::map::{Map, TilePos};
use col_core::ocean::{find_ocean_seeds, Quadrant};
use col_core::region::{Bounds, RegionId};
use thiserror::Error;

/// One broken region invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionIssue {
    /// Stored size differs from the tile count.
    #[error("region {region} records {recorded} tiles but has {actual}")]
    SizeMismatch {
        /// Region id.
        region: RegionId,
        /// Stored size.
        recorded: usize,
        /// Tiles actually in the region.
        actual: usize,
    },

    /// Stored bounds are not the minimal cover of the tiles.
    #[error("region {region} records bounds {recorded} but its tiles cover {actual}")]
    BoundsMismatch {
        /// Region id.
        region: RegionId,
        /// Stored bounds.
        recorded: BoundsText,
        /// Bounds covering the tiles.
        actual: BoundsText,
    },

    /// A region names a parent that is not registered.
    #[error("region {region} has unknown parent {parent}")]
    MissingParent {
        /// Region id.
        region: RegionId,
        /// The missing parent.
        parent: RegionId,
    },

    /// A tile points at a region that is not registered.
    #[error("tile {pos} points at unknown region {region}")]
    UnknownRegion {
        /// The tile.
        pos: TilePos,
        /// The region it names.
        region: RegionId,
    },

    /// A water tile reachable from an ocean seed was never assigned.
    #[error("water tile {pos} is reachable from the {quadrant} seed but unassigned")]
    UnassignedWater {
        /// The tile.
        pos: TilePos,
        /// Quadrant whose seed reaches it.
        quadrant: &'static str,
    },
}

/// Printable optional bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsText(pub Option<Bounds>);

impl fmt::Display for BoundsText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(b) => write!(f, "({}, {})..=({}, {})", b.min_x, b.min_y, b.max_x, b.max_y),
            None => f.write_str("empty"),
        }
    }
}

/// Outcome of [`validate_regions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Regions examined.
    pub regions_checked: usize,
    /// Water tiles with no region.
    pub unassigned_water: usize,
    /// Every broken invariant, in discovery order.
    pub issues: Vec<RegionIssue>,
}

impl ValidationReport {
    /// Whether no invariant is broken.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every region invariant of `map`.
#[must_use]
pub fn validate_regions(map: &Map) -> ValidationReport {
    let mut report = ValidationReport::default();
    let regions = map.regions();

    for region in regions.iter() {
        report.regions_checked += 1;
        let id = region.id();
        let actual = map.tiles_in_region(id.as_str()).count();
        if region.size() != actual {
            report.issues.push(RegionIssue::SizeMismatch {
                region: id.clone(),
                recorded: region.size(),
                actual,
            });
        }
        let cover = Bounds::covering(map.tiles_in_region(id.as_str()));
        if region.bounds() != cover {
            report.issues.push(RegionIssue::BoundsMismatch {
                region: id.clone(),
                recorded: BoundsText(region.bounds()),
                actual: BoundsText(cover),
            });
        }
        if let Some(parent) = &region.parent {
            if !regions.contains(parent.as_str()) {
                report.issues.push(RegionIssue::MissingParent {
                    region: id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    for tile in map.tiles() {
        match &tile.region {
            Some(region) if !regions.contains(region.as_str()) => {
                report.issues.push(RegionIssue::UnknownRegion {
                    pos: tile.pos,
                    region: region.clone(),
                });
            }
            None if tile.is_water() => report.unassigned_water += 1,
            _ => {}
        }
    }

    check_seed_reachability(map, &mut report);

    tracing::debug!(
        regions = report.regions_checked,
        issues = report.issues.len(),
        unassigned_water = report.unassigned_water,
        "Regions validated"
    );
    report
}

/// Walk the water connected to each ocean seed and flag unassigned tiles.
fn check_seed_reachability(map: &Map, report: &mut ValidationReport) {
    let seeds = find_ocean_seeds(map);
    let width = map.width() as usize;
    let index = |p: TilePos| p.y as usize * width + p.x as usize;
    let mut seen = vec![false; width * map.height() as usize];

    for quadrant in Quadrant::ALL {
        let Some(seed) = seeds.get(quadrant) else {
            continue;
        };
        if seen[index(seed)] {
            continue;
        }
        seen[index(seed)] = true;
        let mut queue = VecDeque::from([seed]);
        while let Some(pos) = queue.pop_front() {
            if map.tile(pos).is_some_and(|t| t.region.is_none()) {
                report.issues.push(RegionIssue::UnassignedWater {
                    pos,
                    quadrant: quadrant.label(),
                });
            }
            for next in map.neighbours(pos) {
                if !seen[index(next)] && !map.is_land(next) {
                    seen[index(next)] = true;
                    queue.push_back(next);
                }
            }
        }
    }
}
