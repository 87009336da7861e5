//! Static floor geometry: coordinate conversion, wall and minable-region tests.

mod templates;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Depth, Rect, TilePos, Vec2};

pub use templates::{FloorTemplate, TemplateLibrary};

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("no geometry for floor template `{0}`")]
    Missing(&'static str),
    #[error("failed to read floor geometry {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed floor geometry {path}: {source}")]
    Malformed { path: PathBuf, source: serde_json::Error },
    #[error("floor geometry is invalid: {0}")]
    Invalid(String),
}

/// Query surface of a loaded floor map.
pub trait FloorGeometry {
    fn tile_size(&self) -> f32;

    /// `(columns, rows)`.
    fn grid_size(&self) -> (i32, i32);

    fn static_collides(&self, pos: Vec2, radius: f32) -> bool;

    fn region_contains(&self, pos: Vec2) -> bool;

    fn main_stairs_center(&self) -> Vec2;

    fn spawn_point(&self) -> Vec2;

    /// Centre of the tile in world space.
    fn tile_to_world(&self, tile: TilePos) -> Vec2 {
        let size = self.tile_size();
        Vec2::new((tile.col as f32 + 0.5) * size, (tile.row as f32 + 0.5) * size)
    }

    fn world_to_tile(&self, pos: Vec2) -> TilePos {
        let size = self.tile_size();
        TilePos::new((pos.x / size).floor() as i32, (pos.y / size).floor() as i32)
    }

    fn content_size(&self) -> Vec2 {
        let (cols, rows) = self.grid_size();
        let size = self.tile_size();
        Vec2::new(cols as f32 * size, rows as f32 * size)
    }

    fn snap_to_tile_center(&self, pos: Vec2) -> Vec2 {
        self.tile_to_world(self.world_to_tile(pos))
    }
}

/// Source of per-template floor geometry.
pub trait FloorLibrary {
    fn load(&self, template: FloorTemplate) -> Result<StaticFloor, GeometryError>;

    fn is_bottom_floor(&self, depth: Depth) -> bool {
        depth.is_bottom()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Vec2>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Even-odd ray cast.
    pub fn contains(&self, pos: Vec2) -> bool {
        let count = self.points.len();
        if count < 3 {
            return false;
        }
        let mut inside = false;
        let mut previous = count - 1;
        for current in 0..count {
            let a = self.points[current];
            let b = self.points[previous];
            if (a.y > pos.y) != (b.y > pos.y) {
                let cross_x = a.x + (pos.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if pos.x < cross_x {
                    inside = !inside;
                }
            }
            previous = current;
        }
        inside
    }

    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        if self.contains(center) {
            return true;
        }
        let radius_sq = radius * radius;
        self.edges().any(|(a, b)| segment_distance_squared(center, a, b) <= radius_sq)
    }

    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let count = self.points.len();
        (0..count).map(move |index| (self.points[index], self.points[(index + 1) % count]))
    }
}

fn segment_distance_squared(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_sq = ab.x * ab.x + ab.y * ab.y;
    if length_sq <= f32::EPSILON {
        return point.distance_squared(a);
    }
    let ap = point - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / length_sq).clamp(0.0, 1.0);
    point.distance_squared(Vec2::new(a.x + ab.x * t, a.y + ab.y * t))
}

/// Plain-data form of an extracted floor map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFloor {
    pub tile_size: f32,
    pub columns: i32,
    pub rows: i32,
    pub walls: Vec<Rect>,
    pub wall_polygons: Vec<Polygon>,
    pub regions: Vec<Rect>,
    pub region_polygons: Vec<Polygon>,
    pub stairs_center: Vec2,
    pub spawn: Vec2,
}

impl Default for StaticFloor {
    fn default() -> Self {
        Self::empty(16.0)
    }
}

impl StaticFloor {
    /// Zero-sized floor with nothing to collide with and nowhere to place obstacles.
    pub fn empty(tile_size: f32) -> Self {
        Self {
            tile_size,
            columns: 0,
            rows: 0,
            walls: Vec::new(),
            wall_polygons: Vec::new(),
            regions: Vec::new(),
            region_polygons: Vec::new(),
            stairs_center: Vec2::ZERO,
            spawn: Vec2::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns <= 0 || self.rows <= 0
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.tile_size > 0.0) {
            return Err(GeometryError::Invalid(format!(
                "tile size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.columns < 0 || self.rows < 0 {
            return Err(GeometryError::Invalid(format!(
                "negative grid {}x{}",
                self.columns, self.rows
            )));
        }
        Ok(())
    }

    /// Reads a floor serialized as JSON.
    pub fn load_json(path: &Path) -> Result<Self, GeometryError> {
        let content = fs::read_to_string(path)
            .map_err(|source| GeometryError::Io { path: path.to_path_buf(), source })?;
        let floor: Self = serde_json::from_str(&content)
            .map_err(|source| GeometryError::Malformed { path: path.to_path_buf(), source })?;
        floor.validate()?;
        Ok(floor)
    }
}

impl FloorGeometry for StaticFloor {
    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn grid_size(&self) -> (i32, i32) {
        (self.columns, self.rows)
    }

    fn static_collides(&self, pos: Vec2, radius: f32) -> bool {
        self.walls.iter().any(|wall| wall.intersects_circle(pos, radius))
            || self.wall_polygons.iter().any(|polygon| polygon.intersects_circle(pos, radius))
    }

    fn region_contains(&self, pos: Vec2) -> bool {
        self.regions.iter().any(|region| region.contains(pos))
            || self.region_polygons.iter().any(|polygon| polygon.contains(pos))
    }

    fn main_stairs_center(&self) -> Vec2 {
        self.stairs_center
    }

    fn spawn_point(&self) -> Vec2 {
        self.spawn
    }
}

/// Loads `<root>/<template>.json` for each template.
#[derive(Clone, Debug)]
pub struct DirectoryLibrary {
    root: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, template: FloorTemplate) -> PathBuf {
        self.root.join(format!("{}.json", template.name()))
    }
}

impl FloorLibrary for DirectoryLibrary {
    fn load(&self, template: FloorTemplate) -> Result<StaticFloor, GeometryError> {
        let path = self.path_for(template);
        if !path.exists() {
            return Err(GeometryError::Missing(template.name()));
        }
        StaticFloor::load_json(&path)
    }
}
