//! Ocean partitioning tests on fixture and random maps.
//!
//! These tests drive the public fill API the way map generation and map
//! import do, and check the region invariants after every step.

use std::collections::{BTreeSet, VecDeque};

use col_core::map::{Map, Rect, TilePos};
use col_core::ocean::{
    fill_ocean, find_ocean_seeds, make_fixed_oceans, Quadrant, FIXED_OCEANS, NORTH_ATLANTIC,
    SOUTH_ATLANTIC,
};
use col_core::region::{Bounds, Region, RegionId, RegionType};
use col_test_utils::fixtures::{ascii_map, center_island_map, EASTERN_INLET, LAKE_AND_ISTHMUS};
use col_test_utils::strategies::{arb_map, arb_tile_pos};
use proptest::prelude::*;

// =============================================================================
// Helpers
// =============================================================================

/// Water tiles reachable from `seed` inside `rect`, by plain BFS.
fn reachable_water(map: &Map, seed: TilePos, rect: Rect) -> BTreeSet<TilePos> {
    let mut seen = BTreeSet::new();
    if !rect.contains(seed) || map.is_land(seed) {
        return seen;
    }
    let mut queue = VecDeque::from([seed]);
    seen.insert(seed);
    while let Some(pos) = queue.pop_front() {
        for next in map.neighbours(pos) {
            if rect.contains(next) && !map.is_land(next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

fn assert_region_invariants(map: &Map) {
    for region in map.regions().iter() {
        map.check_region(region.id().as_str())
            .unwrap_or_else(|e| panic!("{e}"));
    }
}

fn with_sea(mut map: Map) -> Map {
    map.regions_mut()
        .insert(Region::new("sea", RegionType::Ocean, None))
        .unwrap();
    map
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn center_island_is_fully_partitioned() {
    let mut map = center_island_map();
    let seeds = find_ocean_seeds(&map);
    assert_eq!(seeds.get(Quadrant::NorthPacific), Some(TilePos::new(0, 4)));
    assert_eq!(seeds.get(Quadrant::NorthAtlantic), Some(TilePos::new(9, 4)));
    assert_eq!(seeds.get(Quadrant::SouthPacific), Some(TilePos::new(0, 5)));
    assert_eq!(seeds.get(Quadrant::SouthAtlantic), Some(TilePos::new(9, 5)));

    let report = make_fixed_oceans(&mut map).unwrap().unwrap();

    let water = map.tiles().filter(|t| t.is_water()).count();
    assert_eq!(water, 91);
    assert_eq!(report.total(), water);
    for tile in map.tiles().filter(|t| t.is_water()) {
        let region = tile.region.as_ref().expect("water tile left unassigned");
        assert!(
            Quadrant::ALL.iter().any(|q| q.region_id() == region.as_str()),
            "{} assigned to {region}",
            tile.pos
        );
    }
    assert_region_invariants(&map);
}

#[test]
fn eastern_inlet_stays_with_its_ocean() {
    let mut map = ascii_map(EASTERN_INLET);
    make_fixed_oceans(&mut map).unwrap();

    // The inlet opens to the north-east only, so it belongs to the North
    // Atlantic even below the midline.
    let inlet = TilePos::new(7, 6);
    assert_eq!(
        map.tile(inlet).unwrap().region.as_ref().map(RegionId::as_str),
        Some(NORTH_ATLANTIC)
    );
    assert_eq!(
        map.tile(TilePos::new(11, 8))
            .unwrap()
            .region
            .as_ref()
            .map(RegionId::as_str),
        Some(SOUTH_ATLANTIC)
    );
    assert_region_invariants(&map);
}

#[test]
fn enclosed_lake_is_not_claimed() {
    let mut map = ascii_map(LAKE_AND_ISTHMUS);
    make_fixed_oceans(&mut map).unwrap();
    for pos in [TilePos::new(2, 2), TilePos::new(3, 2)] {
        assert!(map.tile(pos).unwrap().region.is_none(), "lake tile {pos} claimed");
    }
}

#[test]
fn refilling_absorbs_nothing() {
    let mut map = center_island_map();
    make_fixed_oceans(&mut map).unwrap();
    let before = map.clone();

    for quadrant in Quadrant::ALL {
        let id = RegionId::new(quadrant.region_id());
        let seed = find_ocean_seeds(&map).get(quadrant).unwrap();
        let area = map.area();
        assert_eq!(fill_ocean(&mut map, seed, &id, area).unwrap(), 0);
    }
    assert_eq!(map, before);
}

#[test]
fn registry_survives_ron_round_trip() {
    let mut map = center_island_map();
    make_fixed_oceans(&mut map).unwrap();

    let text = map.regions().to_ron().unwrap();
    let restored = col_core::region::RegionRegistry::from_ron(&text).unwrap();
    assert_eq!(&restored, map.regions());
    for id in FIXED_OCEANS {
        let (a, b) = (restored.get(id).unwrap(), map.regions().get(id).unwrap());
        assert_eq!(a.size(), b.size());
        assert_eq!(a.bounds(), b.bounds());
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Every water tile reachable from the seed inside the pass rectangle
    /// ends up in the region, and nothing else does.
    #[test]
    fn fill_claims_exactly_the_reachable_water(
        map in arb_map(14, 14),
        seed in arb_tile_pos(14, 14),
        rect in (0u32..14, 0u32..14, 1u32..15, 1u32..15),
    ) {
        prop_assume!(map.in_bounds(seed));
        let rect = Rect::new(rect.0, rect.1, rect.2, rect.3);
        let mut map = with_sea(map);
        let expected = reachable_water(&map, seed, rect);

        let id = RegionId::new("sea");
        let filled = fill_ocean(&mut map, seed, &id, rect).unwrap();

        let claimed: BTreeSet<TilePos> = map.tiles_in_region("sea").collect();
        prop_assert_eq!(filled, expected.len());
        prop_assert_eq!(&claimed, &expected);
        prop_assert_eq!(map.regions().size("sea"), Some(expected.len()));
        prop_assert_eq!(
            map.regions().bounds("sea"),
            Some(Bounds::covering(expected.iter().copied()))
        );
    }

    /// Partitioning twice leaves the map exactly as the first run did.
    #[test]
    fn make_fixed_oceans_is_idempotent(map in arb_map(16, 16)) {
        let mut map = map;
        make_fixed_oceans(&mut map).unwrap();
        let first = map.clone();
        prop_assert!(make_fixed_oceans(&mut map).unwrap().is_none());
        prop_assert_eq!(&map, &first);
    }

    /// Sizes and bounds match the tiles after partitioning, and the quadrant
    /// oceans never overlap.
    #[test]
    fn partition_keeps_region_invariants(map in arb_map(16, 16)) {
        let mut map = map;
        let report = make_fixed_oceans(&mut map).unwrap().unwrap();
        for id in FIXED_OCEANS {
            prop_assert!(map.check_region(id).is_ok(), "{}", id);
        }
        let assigned = map.tiles().filter(|t| t.region.is_some()).count();
        prop_assert_eq!(report.total(), assigned);
        prop_assert!(map.tiles().filter(|t| t.land).all(|t| t.region.is_none()));
    }

    /// Adding tiles one at a time only ever grows the bounds, and always to
    /// cover the new tile.
    #[test]
    fn add_tile_grows_bounds_minimally(
        tiles in proptest::collection::vec(arb_tile_pos(12, 12), 1..30),
    ) {
        let mut map = with_sea(Map::new(12, 12));
        let id = RegionId::new("sea");
        let mut added = BTreeSet::new();
        for pos in tiles {
            let before = map.regions().bounds("sea").flatten();
            map.add_tile_to_region(pos, &id).unwrap();
            added.insert(pos);

            let after = map.regions().bounds("sea").flatten().unwrap();
            prop_assert!(after.contains(pos.x, pos.y));
            if let Some(before) = before {
                prop_assert!(after.contains_bounds(&before));
            }
            prop_assert_eq!(Some(after), Bounds::covering(added.iter().copied()));
            prop_assert_eq!(map.regions().size("sea"), Some(added.len()));
        }
    }
}
