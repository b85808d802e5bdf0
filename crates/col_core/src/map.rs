//! The tile grid.
//!
//! Tiles are addressed by coordinate and stored row-major. Each tile is
//! land or water, may belong to one region and may hold one settlement.
//! The region registry lives with the map so that the tile side and the
//! region side of the membership relation are always updated together.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::objects::ObjectId;
use crate::region::{Bounds, RegionId, RegionRegistry};

/// Snapshot format version for compatibility.
pub const MAP_FORMAT_VERSION: u32 = 1;

/// Tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl TilePos {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The eight map directions, in a fixed order.
///
/// Every traversal iterates [`Direction::ALL`] so results do not depend on
/// anything but the map contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// North.
    N,
    /// North-east.
    NE,
    /// East.
    E,
    /// South-east.
    SE,
    /// South.
    S,
    /// South-west.
    SW,
    /// West.
    W,
    /// North-west.
    NW,
}

impl Direction {
    /// All directions in iteration order.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// Column and row delta of one step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::N => (0, -1),
            Self::NE => (1, -1),
            Self::E => (1, 0),
            Self::SE => (1, 1),
            Self::S => (0, 1),
            Self::SW => (-1, 1),
            Self::W => (-1, 0),
            Self::NW => (-1, -1),
        }
    }
}

/// Half-open rectangle of tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle contains a tile.
    #[must_use]
    pub const fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x - self.x < self.width
            && pos.y - self.y < self.height
    }
}

/// One map tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Where the tile is.
    pub pos: TilePos,
    /// Land or water.
    pub land: bool,
    /// Region the tile belongs to.
    pub region: Option<RegionId>,
    /// Settlement on the tile.
    pub settlement: Option<ObjectId>,
}

impl Tile {
    /// Whether this is a water tile.
    #[must_use]
    pub const fn is_water(&self) -> bool {
        !self.land
    }
}

/// The game map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Map {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    regions: RegionRegistry,
}

impl Map {
    /// Create an all-water map with no regions.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero. Use [`Map::try_new`] for
    /// dimensions that come from input.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "Map width must be positive");
        assert!(height > 0, "Map height must be positive");
        Self::all_water(width, height)
    }

    /// Create an all-water map, rejecting empty dimensions.
    pub fn try_new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidState(format!(
                "Map dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self::all_water(width, height))
    }

    fn all_water(width: u32, height: u32) -> Self {
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| TilePos::new(x, y)))
            .map(|pos| Tile {
                pos,
                land: false,
                region: None,
                settlement: None,
            })
            .collect();
        Self {
            width,
            height,
            tiles,
            regions: RegionRegistry::new(),
        }
    }

    /// Map width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Map height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Rectangle covering the whole map.
    #[must_use]
    pub const fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Check if coordinates are within map bounds.
    #[must_use]
    pub const fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: TilePos) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }

    /// Tile at a coordinate.
    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.in_bounds(pos).then(|| &self.tiles[self.index(pos)])
    }

    /// Mutable tile at a coordinate.
    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        if self.in_bounds(pos) {
            let index = self.index(pos);
            Some(&mut self.tiles[index])
        } else {
            None
        }
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Whether the tile is land. Off-map positions are not land.
    #[must_use]
    pub fn is_land(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(|t| t.land)
    }

    /// Mark a tile as land or water.
    pub fn set_land(&mut self, pos: TilePos, land: bool) -> Result<()> {
        self.tile_mut(pos)
            .ok_or(GameError::InvalidCoordinate { x: pos.x, y: pos.y })?
            .land = land;
        Ok(())
    }

    /// The tile one step away in `direction`, if it is on the map.
    #[must_use]
    pub fn adjacent(&self, pos: TilePos, direction: Direction) -> Option<TilePos> {
        let (dx, dy) = direction.offset();
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        let next = TilePos::new(x, y);
        self.in_bounds(next).then_some(next)
    }

    /// On-map neighbours in direction order.
    pub fn neighbours(&self, pos: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.adjacent(pos, d))
    }

    /// The region registry.
    #[must_use]
    pub const fn regions(&self) -> &RegionRegistry {
        &self.regions
    }

    /// Mutable access to the region registry.
    pub fn regions_mut(&mut self) -> &mut RegionRegistry {
        &mut self.regions
    }

    /// Region of a tile, resolved through the registry.
    #[must_use]
    pub fn region_of(&self, pos: TilePos) -> Option<&crate::region::Region> {
        let id = self.tile(pos)?.region.as_ref()?;
        self.regions.get(id.as_str())
    }

    /// Make `pos` a member of region `id`.
    ///
    /// Sets the tile's region and grows the region's size and bounds.
    /// Returns `Ok(false)` if the tile already belonged to the region. A tile
    /// taken from another region is subtracted from that region, whose
    /// bounds are recomputed.
    pub fn add_tile_to_region(&mut self, pos: TilePos, id: &RegionId) -> Result<bool> {
        if !self.regions.contains(id.as_str()) {
            return Err(GameError::RegionNotFound(id.to_string()));
        }
        let tile = self
            .tile_mut(pos)
            .ok_or(GameError::InvalidCoordinate { x: pos.x, y: pos.y })?;
        if tile.region.as_ref() == Some(id) {
            return Ok(false);
        }
        let previous = tile.region.replace(id.clone());

        if let Some(previous) = previous {
            self.recount_region(previous.as_str())?;
        }
        if let Some(region) = self.regions.get_mut(id.as_str()) {
            region.add_tile(pos);
        }
        Ok(true)
    }

    /// Positions of all tiles in a region, row-major.
    pub fn tiles_in_region<'a>(&'a self, id: &'a str) -> impl Iterator<Item = TilePos> + 'a {
        self.tiles
            .iter()
            .filter(move |t| t.region.as_ref().is_some_and(|r| r.as_str() == id))
            .map(|t| t.pos)
    }

    /// Recompute a region's size and bounds from the tiles.
    pub fn recount_region(&mut self, id: &str) -> Result<()> {
        let size = self.tiles_in_region(id).count();
        let bounds = Bounds::covering(self.tiles_in_region(id));
        let region = self
            .regions
            .get_mut(id)
            .ok_or_else(|| GameError::RegionNotFound(id.to_owned()))?;
        region.set_size(size);
        region.set_bounds(bounds);
        Ok(())
    }

    /// Check that a region's stored size and bounds match its tiles.
    pub fn check_region(&self, id: &str) -> Result<()> {
        let region = self
            .regions
            .get(id)
            .ok_or_else(|| GameError::RegionNotFound(id.to_owned()))?;
        let size = self.tiles_in_region(id).count();
        if region.size() != size {
            return Err(GameError::InvalidState(format!(
                "Region {id} has size {} but {size} tiles",
                region.size()
            )));
        }
        let bounds = Bounds::covering(self.tiles_in_region(id));
        if region.bounds() != bounds {
            return Err(GameError::InvalidState(format!(
                "Region {id} has bounds {:?} but its tiles cover {bounds:?}",
                region.bounds()
            )));
        }
        Ok(())
    }

    /// Shortest path from `from` to `to` over tiles accepted by `passable`.
    ///
    /// The returned path excludes `from` and ends at `to`. Ties are broken by
    /// direction order, so the same map always yields the same path.
    pub fn find_path<F>(&self, from: TilePos, to: TilePos, passable: F) -> Option<Vec<TilePos>>
    where
        F: Fn(&Tile) -> bool,
    {
        if !self.in_bounds(from) || !self.in_bounds(to) {
            return None;
        }
        if from == to {
            return Some(Vec::new());
        }

        let mut came_from: Vec<Option<TilePos>> = vec![None; self.tiles.len()];
        let mut visited = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();
        visited[self.index(from)] = true;
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![to];
                let mut step = to;
                while let Some(prev) = came_from[self.index(step)] {
                    if prev == from {
                        break;
                    }
                    path.push(prev);
                    step = prev;
                }
                path.reverse();
                return Some(path);
            }
            for next in self.neighbours(current) {
                let index = self.index(next);
                if visited[index] || !passable(&self.tiles[index]) {
                    continue;
                }
                visited[index] = true;
                came_from[index] = Some(current);
                queue.push_back(next);
            }
        }
        None
    }

    /// Parse an ASCII map: `#` is land, `~` or `.` is water.
    ///
    /// Blank lines are skipped; every remaining row must have the same width.
    pub fn from_ascii(text: &str) -> Result<Self> {
        let rows: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end()))
            .filter(|(_, l)| !l.is_empty())
            .collect();

        let Some(&(first_line, first)) = rows.first() else {
            return Err(GameError::MapParse {
                line: 1,
                column: 1,
                message: "map is empty".into(),
            });
        };
        let width = first.chars().count();
        let mut map = Self::new(width as u32, rows.len() as u32);

        for (y, &(line, row)) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(GameError::MapParse {
                    line,
                    column: 1,
                    message: format!(
                        "row has {} tiles, line {first_line} has {width}",
                        row.chars().count()
                    ),
                });
            }
            for (x, c) in row.chars().enumerate() {
                let land = match c {
                    '#' => true,
                    '~' | '.' => false,
                    other => {
                        return Err(GameError::MapParse {
                            line,
                            column: x + 1,
                            message: format!("unexpected tile character '{other}'"),
                        })
                    }
                };
                map.set_land(TilePos::new(x as u32, y as u32), land)?;
            }
        }
        Ok(map)
    }

    /// Render the land/water layout as ASCII (`#` land, `~` water).
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for row in self.tiles.chunks(self.width as usize) {
            out.extend(row.iter().map(|t| if t.land { '#' } else { '~' }));
            out.push('\n');
        }
        out
    }

    /// Deterministic hash of the full map state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the map, tiles and regions included, to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(&SnapshotRef {
            version: MAP_FORMAT_VERSION,
            map: self,
        })
        .map_err(|e| GameError::InvalidState(format!("Failed to serialize map: {e}")))
    }

    /// Restore a map from [`Map::serialize`] output.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize map: {e}")))?;
        if snapshot.version != MAP_FORMAT_VERSION {
            return Err(GameError::InvalidState(format!(
                "Map version mismatch: expected {}, got {}",
                MAP_FORMAT_VERSION, snapshot.version
            )));
        }
        snapshot.map.check_shape()?;
        Ok(snapshot.map)
    }

    /// Check that the tile vector matches the dimensions, row by row.
    pub fn check_shape(&self) -> Result<()> {
        let expected = u64::from(self.width) * u64::from(self.height);
        if self.width == 0 || self.height == 0 || self.tiles.len() as u64 != expected {
            return Err(GameError::InvalidState(format!(
                "Map is {}x{} but holds {} tiles",
                self.width,
                self.height,
                self.tiles.len()
            )));
        }
        for (i, tile) in self.tiles.iter().enumerate() {
            if !self.in_bounds(tile.pos) || self.index(tile.pos) != i {
                return Err(GameError::InvalidState(format!(
                    "Tile {} is stored out of place",
                    tile.pos
                )));
            }
        }
        Ok(())
    }

    /// Save a snapshot to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.serialize()?;
        std::fs::write(path.as_ref(), bytes).map_err(|e| GameError::Persistence {
            path: path.as_ref().display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load a snapshot from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| GameError::Persistence {
            path: path.as_ref().display().to_string(),
            message: e.to_string(),
        })?;
        Self::deserialize(&bytes)
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    map: &'a Map,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    map: Map,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Region, RegionType};

    fn map_with_region(id: &str) -> Map {
        let mut map = Map::new(6, 4);
        map.regions_mut()
            .insert(Region::new(id, RegionType::Ocean, None))
            .unwrap();
        map
    }

    #[test]
    fn test_adjacent_stays_on_map() {
        let map = Map::new(3, 3);
        let corner = TilePos::new(0, 0);
        assert_eq!(map.adjacent(corner, Direction::N), None);
        assert_eq!(map.adjacent(corner, Direction::W), None);
        assert_eq!(map.adjacent(corner, Direction::SE), Some(TilePos::new(1, 1)));
        assert_eq!(map.neighbours(corner).count(), 3);
        assert_eq!(map.neighbours(TilePos::new(1, 1)).count(), 8);
    }

    #[test]
    fn test_rect_is_half_open() {
        let rect = Rect::new(2, 2, 3, 1);
        assert!(rect.contains(TilePos::new(2, 2)));
        assert!(rect.contains(TilePos::new(4, 2)));
        assert!(!rect.contains(TilePos::new(5, 2)));
        assert!(!rect.contains(TilePos::new(2, 3)));
        assert!(!rect.contains(TilePos::new(1, 2)));
    }

    #[test]
    fn test_add_tile_to_region_counts_once() {
        let mut map = map_with_region("sea");
        let id = RegionId::new("sea");
        assert!(map.add_tile_to_region(TilePos::new(1, 1), &id).unwrap());
        assert!(!map.add_tile_to_region(TilePos::new(1, 1), &id).unwrap());
        assert!(map.add_tile_to_region(TilePos::new(3, 2), &id).unwrap());

        let region = map.regions().get("sea").unwrap();
        assert_eq!(region.size(), 2);
        let b = region.bounds().unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (1, 1, 3, 2));
        assert_eq!(map.region_of(TilePos::new(3, 2)).unwrap().id(), &id);
    }

    #[test]
    fn test_moving_tile_shrinks_previous_region() {
        let mut map = map_with_region("a");
        map.regions_mut()
            .insert(Region::new("b", RegionType::Ocean, None))
            .unwrap();
        let a = RegionId::new("a");
        let b = RegionId::new("b");
        map.add_tile_to_region(TilePos::new(0, 0), &a).unwrap();
        map.add_tile_to_region(TilePos::new(5, 3), &a).unwrap();

        map.add_tile_to_region(TilePos::new(5, 3), &b).unwrap();

        let region_a = map.regions().get("a").unwrap();
        assert_eq!(region_a.size(), 1);
        assert_eq!(region_a.bounds(), Some(Bounds::point(TilePos::new(0, 0))));
        assert_eq!(map.regions().size("b"), Some(1));
        map.check_region("a").unwrap();
        map.check_region("b").unwrap();
    }

    #[test]
    fn test_check_region_detects_drift() {
        let mut map = map_with_region("sea");
        map.add_tile_to_region(TilePos::new(2, 2), &RegionId::new("sea"))
            .unwrap();
        map.regions_mut().set_size("sea", 5).unwrap();
        assert!(map.check_region("sea").is_err());
        map.recount_region("sea").unwrap();
        map.check_region("sea").unwrap();
    }

    #[test]
    fn test_add_tile_to_unknown_region_fails() {
        let mut map = Map::new(2, 2);
        let err = map
            .add_tile_to_region(TilePos::new(0, 0), &RegionId::new("nowhere"))
            .unwrap_err();
        assert!(matches!(err, GameError::RegionNotFound(_)));
        assert!(map.tile(TilePos::new(0, 0)).unwrap().region.is_none());
    }

    #[test]
    fn test_ascii_roundtrip() {
        let text = "~~##\n~#~~\n~~~~\n";
        let map = Map::from_ascii(text).unwrap();
        assert_eq!((map.width(), map.height()), (4, 3));
        assert!(map.is_land(TilePos::new(2, 0)));
        assert!(!map.is_land(TilePos::new(0, 0)));
        assert_eq!(map.to_ascii(), text);
    }

    #[test]
    fn test_ascii_rejects_ragged_rows() {
        let err = Map::from_ascii("~~~\n~~\n").unwrap_err();
        assert!(matches!(err, GameError::MapParse { line: 2, .. }));
    }

    #[test]
    fn test_ascii_rejects_unknown_characters() {
        let err = Map::from_ascii("~~\n~X\n").unwrap_err();
        assert!(matches!(
            err,
            GameError::MapParse {
                line: 2,
                column: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_find_path_goes_around_land() {
        let map = Map::from_ascii(
            "\
~~~~~
~###~
~~~#~
",
        )
        .unwrap();
        let path = map
            .find_path(TilePos::new(0, 2), TilePos::new(4, 2), Tile::is_water)
            .unwrap();
        assert_eq!(path.last(), Some(&TilePos::new(4, 2)));
        assert!(path.iter().all(|p| !map.is_land(*p)));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_find_path_unreachable() {
        let map = Map::from_ascii("~#~\n~#~\n").unwrap();
        assert!(map
            .find_path(TilePos::new(0, 0), TilePos::new(2, 0), Tile::is_water)
            .is_none());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut map = map_with_region("sea");
        map.set_land(TilePos::new(2, 2), true).unwrap();
        map.add_tile_to_region(TilePos::new(0, 0), &RegionId::new("sea"))
            .unwrap();

        let bytes = map.serialize().unwrap();
        let restored = Map::deserialize(&bytes).unwrap();
        assert_eq!(restored, map);
        assert_eq!(restored.state_hash(), map.state_hash());
    }

    #[test]
    fn test_try_new_rejects_empty_dimensions() {
        assert!(matches!(Map::try_new(0, 5), Err(GameError::InvalidState(_))));
        assert!(matches!(Map::try_new(5, 0), Err(GameError::InvalidState(_))));
        assert_eq!(Map::try_new(3, 2).unwrap(), Map::new(3, 2));
    }

    #[test]
    fn test_deserialize_rejects_truncated_tiles() {
        let mut map = Map::new(4, 3);
        map.tiles.pop();
        let bytes = map.serialize().unwrap();
        assert!(matches!(
            Map::deserialize(&bytes),
            Err(GameError::InvalidState(_))
        ));
    }

    #[test]
    fn test_deserialize_rejects_misplaced_tiles() {
        let mut map = Map::new(4, 3);
        map.tiles.swap(0, 5);
        let bytes = map.serialize().unwrap();
        assert!(Map::deserialize(&bytes).is_err());
    }
}
