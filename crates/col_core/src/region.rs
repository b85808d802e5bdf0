//! Named map regions and the registry that owns them.
//!
//! A region is a named partition of map tiles (an ocean basin, a mountain
//! range, ...). Tiles refer to their region by [`RegionId`]; the region in
//! turn tracks how many tiles it holds and the smallest box containing them.
//! Regions form a hierarchy through an optional parent id. Neither relation
//! owns the other side, so removing a region can never dangle a pointer:
//! lookups simply come back empty.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::map::TilePos;
use crate::objects::ObjectId;

/// Stable string key of a region (for example `model.region.pacific`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Create a region id from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionType {
    /// Open ocean.
    Ocean,
    /// Coastal waters.
    Coast,
    /// Inland lake.
    Lake,
    /// River system.
    River,
    /// Generic land.
    Land,
    /// Mountain range.
    Mountain,
    /// Desert.
    Desert,
}

impl RegionType {
    /// Returns true for the water region types.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Ocean | Self::Coast | Self::Lake | Self::River)
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ocean => "OCEAN",
            Self::Coast => "COAST",
            Self::Lake => "LAKE",
            Self::River => "RIVER",
            Self::Land => "LAND",
            Self::Mountain => "MOUNTAIN",
            Self::Desert => "DESERT",
        };
        f.write_str(name)
    }
}

/// Inclusive axis-aligned box of tile coordinates.
///
/// A box built from a single tile has zero span on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest column.
    pub min_x: u32,
    /// Smallest row.
    pub min_y: u32,
    /// Largest column.
    pub max_x: u32,
    /// Largest row.
    pub max_y: u32,
}

impl Bounds {
    /// Zero-sized box at a single tile.
    #[must_use]
    pub const fn point(pos: TilePos) -> Self {
        Self {
            min_x: pos.x,
            min_y: pos.y,
            max_x: pos.x,
            max_y: pos.y,
        }
    }

    /// Grow the box by the minimal amount needed to include `pos`.
    #[must_use]
    pub fn extended(self, pos: TilePos) -> Self {
        Self {
            min_x: self.min_x.min(pos.x),
            min_y: self.min_y.min(pos.y),
            max_x: self.max_x.max(pos.x),
            max_y: self.max_y.max(pos.y),
        }
    }

    /// Minimal box covering every position, or `None` for no positions.
    pub fn covering(positions: impl IntoIterator<Item = TilePos>) -> Option<Self> {
        positions.into_iter().fold(None, |acc, pos| {
            Some(match acc {
                None => Self::point(pos),
                Some(b) => b.extended(pos),
            })
        })
    }

    /// Columns between the first and last, `max_x - min_x`.
    #[must_use]
    pub const fn span_x(&self) -> u32 {
        self.max_x - self.min_x
    }

    /// Rows between the first and last, `max_y - min_y`.
    #[must_use]
    pub const fn span_y(&self) -> u32 {
        self.max_y - self.min_y
    }

    /// Whether the box contains a coordinate.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Whether this box fully contains another.
    #[must_use]
    pub const fn contains_bounds(&self, other: &Self) -> bool {
        self.contains(other.min_x, other.min_y) && self.contains(other.max_x, other.max_y)
    }

    /// Integer midpoint.
    #[must_use]
    pub const fn center(&self) -> TilePos {
        TilePos::new(
            self.min_x + self.span_x() / 2,
            self.min_y + self.span_y() / 2,
        )
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{} {}x{})",
            self.min_x,
            self.min_y,
            self.span_x(),
            self.span_y()
        )
    }
}

/// A named region of the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    id: RegionId,
    /// Player-chosen name, if any.
    pub name: Option<String>,
    /// Message key of the default name.
    pub name_key: String,
    /// Region classification.
    pub region_type: RegionType,
    /// Enclosing region, if any.
    pub parent: Option<RegionId>,
    /// Whether discovering this region is an event worth recording.
    pub discoverable: bool,
    /// Whether every player knows this region from the start.
    pub prediscovered: bool,
    /// Whether a player may claim this region.
    pub claimable: bool,
    /// Score awarded to the first player to discover the region.
    pub score_value: u32,
    discovered_by: Option<ObjectId>,
    discovered_in: Option<u32>,
    size: usize,
    bounds: Option<Bounds>,
}

impl Region {
    /// Create an empty region whose name key equals its id.
    #[must_use]
    pub fn new(id: impl Into<RegionId>, region_type: RegionType, parent: Option<RegionId>) -> Self {
        let id = id.into();
        Self {
            name_key: id.as_str().to_owned(),
            id,
            name: None,
            region_type,
            parent,
            discoverable: false,
            prediscovered: false,
            claimable: false,
            score_value: 0,
            discovered_by: None,
            discovered_in: None,
            size: 0,
            bounds: None,
        }
    }

    /// Copy the descriptive metadata of a region from an imported game.
    ///
    /// The copy starts without parent, tiles or bounds; the caller
    /// reattaches it and refills it against the new map.
    #[must_use]
    pub fn imported(other: &Region, id: impl Into<RegionId>) -> Self {
        Self {
            id: id.into(),
            name: other.name.clone(),
            name_key: other.name_key.clone(),
            region_type: other.region_type,
            parent: None,
            discoverable: other.discoverable,
            prediscovered: other.prediscovered,
            claimable: other.claimable,
            score_value: other.score_value,
            discovered_by: other.discovered_by,
            discovered_in: other.discovered_in,
            size: 0,
            bounds: None,
        }
    }

    /// Set whether the region is discoverable.
    #[must_use]
    pub const fn with_discoverable(mut self, discoverable: bool) -> Self {
        self.discoverable = discoverable;
        self
    }

    /// Set whether the region is prediscovered.
    #[must_use]
    pub const fn with_prediscovered(mut self, prediscovered: bool) -> Self {
        self.prediscovered = prediscovered;
        self
    }

    /// Set the discovery score.
    #[must_use]
    pub const fn with_score_value(mut self, score_value: u32) -> Self {
        self.score_value = score_value;
        self
    }

    /// Region id.
    #[must_use]
    pub const fn id(&self) -> &RegionId {
        &self.id
    }

    /// Number of tiles in this region.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Overwrite the tile count.
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Bounding box of the member tiles, `None` while the region is empty.
    #[must_use]
    pub const fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Overwrite the bounding box.
    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.bounds = bounds;
    }

    /// Player that discovered the region.
    #[must_use]
    pub const fn discovered_by(&self) -> Option<ObjectId> {
        self.discovered_by
    }

    /// Turn the region was discovered in.
    #[must_use]
    pub const fn discovered_in(&self) -> Option<u32> {
        self.discovered_in
    }

    /// Whether some player has discovered the region.
    #[must_use]
    pub const fn is_discovered(&self) -> bool {
        self.discovered_by.is_some()
    }

    /// Count a new member tile and grow the bounds to include it.
    ///
    /// Callers must not count the same tile twice; use
    /// [`Map::add_tile_to_region`](crate::map::Map::add_tile_to_region),
    /// which also maintains the tile side of the relation.
    pub fn add_tile(&mut self, pos: TilePos) {
        self.size += 1;
        self.bounds = Some(match self.bounds {
            None => Bounds::point(pos),
            Some(b) => b.extended(pos),
        });
    }

    /// Integer midpoint of the bounds.
    #[must_use]
    pub fn center(&self) -> Option<TilePos> {
        self.bounds.map(|b| b.center())
    }

    /// Does this region's bounding box contain the center of another?
    #[must_use]
    pub fn contains_center(&self, other: &Region) -> bool {
        match (self.bounds, other.center()) {
            (Some(bounds), Some(c)) => bounds.contains(c.x, c.y),
            _ => false,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} {} {} {} ",
            self.id,
            self.name.as_deref().unwrap_or("(null)"),
            self.name_key,
            self.region_type,
            self.size
        )?;
        match self.bounds {
            Some(b) => write!(f, "{b}]"),
            None => f.write_str("(empty)]"),
        }
    }
}

/// Result of a discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Regions newly marked as discovered.
    pub regions: Vec<RegionId>,
    /// Total score awarded for them.
    pub score: u32,
}

/// All regions of a map keyed by id.
///
/// Backed by a `BTreeMap` so iteration and serialization order are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionRegistry {
    regions: BTreeMap<RegionId, Region>,
}

impl RegionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a region.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Look up a region mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Region> {
        self.regions.get_mut(id)
    }

    /// Whether a region is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.regions.contains_key(id)
    }

    /// Register a region.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateRegion`] if the id is taken.
    pub fn insert(&mut self, region: Region) -> Result<()> {
        if self.regions.contains_key(region.id()) {
            return Err(GameError::DuplicateRegion(region.id().to_string()));
        }
        self.regions.insert(region.id().clone(), region);
        Ok(())
    }

    /// Remove a region. Tiles and children still naming it resolve to nothing.
    pub fn remove(&mut self, id: &str) -> Option<Region> {
        self.regions.remove(id)
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate over regions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Tile count of a region.
    #[must_use]
    pub fn size(&self, id: &str) -> Option<usize> {
        self.get(id).map(Region::size)
    }

    /// Overwrite the tile count of a region.
    pub fn set_size(&mut self, id: &str, size: usize) -> Result<()> {
        self.require_mut(id)?.set_size(size);
        Ok(())
    }

    /// Bounds of a region (`Some(None)` for a registered but empty region).
    #[must_use]
    pub fn bounds(&self, id: &str) -> Option<Option<Bounds>> {
        self.get(id).map(Region::bounds)
    }

    /// Overwrite the bounds of a region.
    pub fn set_bounds(&mut self, id: &str, bounds: Option<Bounds>) -> Result<()> {
        self.require_mut(id)?.set_bounds(bounds);
        Ok(())
    }

    /// Direct children of a region, in id order.
    #[must_use]
    pub fn children(&self, id: &str) -> Vec<&Region> {
        self.regions
            .values()
            .filter(|r| r.parent.as_ref().is_some_and(|p| p.as_str() == id))
            .collect()
    }

    /// The nearest region, starting at `id` and walking up the parents,
    /// whose discovery is worth recording.
    #[must_use]
    pub fn discoverable_region(&self, id: &str) -> Option<&Region> {
        let mut current = self.get(id);
        // Bounded walk: a malformed parent cycle must not spin forever.
        for _ in 0..=self.regions.len() {
            let region = current?;
            if region.discoverable {
                return Some(region);
            }
            current = region.parent.as_ref().and_then(|p| self.get(p.as_str()));
        }
        None
    }

    /// Mark a region as discovered by `player` in `turn`.
    ///
    /// Discovery happens once: the region stops being discoverable and
    /// its discoverable children are discovered along with it. Discovering
    /// a region that is not discoverable changes nothing.
    pub fn discover(&mut self, id: &str, player: ObjectId, turn: u32) -> Result<Discovery> {
        let mut discovery = Discovery::default();
        if !self.require_mut(id)?.discoverable {
            return Ok(discovery);
        }

        let mut pending = vec![RegionId::new(id)];
        while let Some(next) = pending.pop() {
            let Some(region) = self.regions.get_mut(next.as_str()) else {
                continue;
            };
            if !region.discoverable {
                continue;
            }
            region.discoverable = false;
            region.discovered_by = Some(player);
            region.discovered_in = Some(turn);
            discovery.score += region.score_value;
            discovery.regions.push(next.clone());

            pending.extend(
                self.children(next.as_str())
                    .into_iter()
                    .filter(|c| c.discoverable)
                    .map(|c| c.id().clone()),
            );
        }

        tracing::debug!(
            region = id,
            player,
            turn,
            score = discovery.score,
            "Region discovered"
        );
        Ok(discovery)
    }

    /// Serialize the registry to RON.
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize regions: {e}")))
    }

    /// Parse a registry from RON.
    ///
    /// Every key must match the id of the region stored under it.
    pub fn from_ron(text: &str) -> Result<Self> {
        let registry: Self = ron::from_str(text).map_err(|e| GameError::Persistence {
            path: "<ron>".into(),
            message: e.to_string(),
        })?;
        if let Some((key, region)) = registry.regions.iter().find(|(k, r)| *k != r.id()) {
            return Err(GameError::Persistence {
                path: "<ron>".into(),
                message: format!("Region {} is stored under key {key}", region.id()),
            });
        }
        Ok(registry)
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Region> {
        self.regions
            .get_mut(id)
            .ok_or_else(|| GameError::RegionNotFound(id.to_owned()))
    }
}
