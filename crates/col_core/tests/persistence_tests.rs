//! Save and load tests against real files.

use col_core::error::GameError;
use col_core::map::Map;
use col_core::map_generation::{generate_map, MapConfig};
use col_core::region::RegionRegistry;
use col_test_utils::determinism::verify_game_snapshot;
use col_test_utils::fixtures::{partitioned_center_island, sample_game};
use tempfile::tempdir;

#[test]
fn map_snapshot_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("island.map");
    let map = partitioned_center_island();

    map.save(&path).unwrap();
    let restored = Map::load(&path).unwrap();

    assert_eq!(restored, map);
    assert_eq!(restored.state_hash(), map.state_hash());
}

#[test]
fn generated_map_snapshot_keeps_regions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("generated.map");
    let map = generate_map(&MapConfig::small().with_seed(77)).unwrap();

    map.save(&path).unwrap();
    let restored = Map::load(&path).unwrap();
    for region in map.regions().iter() {
        let id = region.id().as_str();
        assert_eq!(restored.regions().size(id), Some(region.size()));
        restored.check_region(id).unwrap();
    }
}

#[test]
fn region_registry_ron_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regions.ron");
    let map = partitioned_center_island();

    std::fs::write(&path, map.regions().to_ron().unwrap()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let restored = RegionRegistry::from_ron(&text).unwrap();
    assert_eq!(&restored, map.regions());
}

#[test]
fn missing_snapshot_names_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.map");
    match Map::load(&path) {
        Err(GameError::Persistence { path: p, .. }) => assert!(p.ends_with("absent.map")),
        other => panic!("expected persistence error, got {other:?}"),
    }
}

#[test]
fn corrupt_snapshot_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.map");
    std::fs::write(&path, b"not a map").unwrap();
    assert!(Map::load(&path).is_err());
}

#[test]
fn game_snapshot_round_trip() {
    assert!(verify_game_snapshot(&sample_game().game));
}
