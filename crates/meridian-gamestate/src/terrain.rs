use meridian_data::{TerrainDef, TilePos};
use rand::Rng;

use crate::error::ConstructionError;

/// A rectangular grid filled with a single tile type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terrain {
    name: String,
    width: u32,
    height: u32,
    tile: String,
}

impl Terrain {
    /// Build terrain from its definition. Zero-sized grids are rejected.
    pub fn from_def(def: &TerrainDef) -> Result<Self, ConstructionError> {
        if def.width == 0 || def.height == 0 {
            return Err(ConstructionError::EmptyTerrain {
                name: def.name.clone(),
                width: def.width,
                height: def.height,
            });
        }
        Ok(Self {
            name: def.name.clone(),
            width: def.width,
            height: def.height,
            tile: def.tile.clone(),
        })
    }

    /// Terrain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `pos` lies on the grid.
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// The tile type at `pos`, if it lies on the grid.
    pub fn tile_at(&self, pos: TilePos) -> Option<&str> {
        self.contains(pos).then_some(self.tile.as_str())
    }

    /// A uniformly chosen tile.
    pub fn random_pos(&self, rng: &mut impl Rng) -> TilePos {
        TilePos::new(
            rng.random_range(0..self.width),
            rng.random_range(0..self.height),
        )
    }
}
