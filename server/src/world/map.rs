//! Tile map collision data.
//!
//! Loads a Tiled JSON export and answers per-point collision queries on the
//! ground and object layers. Which tile ids block movement comes from the
//! `tiles` table.

use std::collections::HashSet;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::MapError;

/// Result of a collision query at a world point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCollision {
    Clear,
    Blocked,
    OutOfBounds,
}

/// Tile layers that take part in collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionLayer {
    Ground,
    Object,
}

impl CollisionLayer {
    pub const ALL: [CollisionLayer; 2] = [CollisionLayer::Ground, CollisionLayer::Object];

    fn index(self) -> usize {
        match self {
            CollisionLayer::Ground => 0,
            CollisionLayer::Object => 1,
        }
    }
}

/// Read-only collision queries used by movement
pub trait MapCollisionOracle: Send + Sync {
    fn check_collision(&self, x: f32, y: f32, layer: CollisionLayer) -> TileCollision;

    /// Tile width and height in world units
    fn tile_size(&self) -> (f32, f32);
}

/// Subset of the Tiled JSON format we read
#[derive(Debug, Deserialize)]
struct TiledMap {
    width: usize,
    height: usize,
    tilewidth: f32,
    tileheight: f32,
    layers: Vec<TiledLayer>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Vec<u32>,
}

/// Tile grid with a set of blocking tile ids
#[derive(Debug, Clone)]
pub struct TileMap {
    width: usize,
    height: usize,
    tile_width: f32,
    tile_height: f32,
    /// Row-major tile ids, ground first
    layers: Vec<Vec<u32>>,
    blocking: HashSet<u32>,
}

impl TileMap {
    /// A map with no blocking tiles
    pub fn open(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_width: tile_size,
            tile_height: tile_size,
            layers: vec![vec![0; width * height]; CollisionLayer::ALL.len()],
            blocking: HashSet::new(),
        }
    }

    /// Parse a Tiled JSON document. The first two tile layers are used as
    /// the ground and object layers.
    pub fn from_tiled_json(json: &str, blocking: HashSet<u32>) -> Result<Self, MapError> {
        let tiled: TiledMap = serde_json::from_str(json)?;
        let expected = tiled.width * tiled.height;

        let mut layers = Vec::new();
        for layer in tiled
            .layers
            .into_iter()
            .filter(|l| l.kind == "tilelayer")
            .take(CollisionLayer::ALL.len())
        {
            if layer.data.len() != expected {
                return Err(MapError::LayerSize {
                    name: layer.name,
                    expected,
                    actual: layer.data.len(),
                });
            }
            layers.push(layer.data);
        }
        if layers.is_empty() {
            return Err(MapError::NoLayers);
        }

        Ok(Self {
            width: tiled.width,
            height: tiled.height,
            tile_width: tiled.tilewidth,
            tile_height: tiled.tileheight,
            layers,
            blocking,
        })
    }

    /// Load a Tiled JSON map file
    pub fn load<P: AsRef<Path>>(path: P, blocking: HashSet<u32>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let map = Self::from_tiled_json(&content, blocking)?;
        info!(
            "Loaded map {:?}: {}x{} tiles, {} layers, {} blocking tile ids",
            path,
            map.width,
            map.height,
            map.layers.len(),
            map.blocking.len()
        );
        Ok(map)
    }

    pub fn set_tile(&mut self, layer: CollisionLayer, tile_x: usize, tile_y: usize, tile_id: u32) {
        if tile_x >= self.width || tile_y >= self.height {
            return;
        }
        let width = self.width;
        if let Some(data) = self.layers.get_mut(layer.index()) {
            data[tile_y * width + tile_x] = tile_id;
        }
    }

    pub fn add_blocking(&mut self, tile_id: u32) {
        self.blocking.insert(tile_id);
    }
}

impl MapCollisionOracle for TileMap {
    fn check_collision(&self, x: f32, y: f32, layer: CollisionLayer) -> TileCollision {
        let tile_x = (x / self.tile_width).floor();
        let tile_y = (y / self.tile_height).floor();
        if tile_x < 0.0
            || tile_y < 0.0
            || tile_x >= self.width as f32
            || tile_y >= self.height as f32
        {
            return TileCollision::OutOfBounds;
        }

        let Some(data) = self.layers.get(layer.index()) else {
            return TileCollision::Clear;
        };
        let tile_id = data[tile_y as usize * self.width + tile_x as usize];
        if self.blocking.contains(&tile_id) {
            TileCollision::Blocked
        } else {
            TileCollision::Clear
        }
    }

    fn tile_size(&self) -> (f32, f32) {
        (self.tile_width, self.tile_height)
    }
}
