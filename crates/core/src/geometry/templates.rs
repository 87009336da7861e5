use serde::{Deserialize, Serialize};

use crate::rng::MineRng;
use crate::types::{Depth, ELEVATOR_INTERVAL, Rect, TilePos, Vec2};

use super::{FloorGeometry, FloorLibrary, GeometryError, Polygon, StaticFloor};

/// Which map a depth is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorTemplate {
    Entrance,
    Corridor,
    Room,
    BonusRoom,
}

impl FloorTemplate {
    pub const ALL: [Self; 4] = [Self::Entrance, Self::Corridor, Self::Room, Self::BonusRoom];

    /// Elevator depths load the bonus room; other floors pick corridor or room on a coin flip.
    pub fn for_depth(depth: Depth, rng: &mut MineRng) -> Self {
        if depth.is_entrance() {
            Self::Entrance
        } else if depth.get() % ELEVATOR_INTERVAL == 0 {
            Self::BonusRoom
        } else if rng.coin() {
            Self::Corridor
        } else {
            Self::Room
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Entrance => "entrance",
            Self::Corridor => "corridor",
            Self::Room => "room",
            Self::BonusRoom => "bonus_room",
        }
    }
}

/// Code-defined floors, one per template.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateLibrary {
    tile_size: f32,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new(16.0)
    }
}

impl TemplateLibrary {
    pub fn new(tile_size: f32) -> Self {
        Self { tile_size }
    }

    fn walled(&self, columns: i32, rows: i32) -> StaticFloor {
        let ts = self.tile_size;
        let width = columns as f32 * ts;
        let height = rows as f32 * ts;
        StaticFloor {
            columns,
            rows,
            walls: vec![
                Rect::new(0.0, 0.0, width, ts),
                Rect::new(0.0, height - ts, width, ts),
                Rect::new(0.0, 0.0, ts, height),
                Rect::new(width - ts, 0.0, ts, height),
            ],
            ..StaticFloor::empty(ts)
        }
    }

    fn tile_rect(&self, col: i32, row: i32, columns: i32, rows: i32) -> Rect {
        let ts = self.tile_size;
        Rect::new(col as f32 * ts, row as f32 * ts, columns as f32 * ts, rows as f32 * ts)
    }

    fn entrance(&self) -> StaticFloor {
        let mut floor = self.walled(20, 15);
        floor.walls.push(self.tile_rect(1, 6, 6, 1));
        floor.stairs_center = floor.tile_to_world(TilePos::new(10, 3));
        floor.spawn = floor.tile_to_world(TilePos::new(10, 12));
        floor
    }

    fn corridor(&self) -> StaticFloor {
        let mut floor = self.walled(40, 12);
        floor.walls.push(self.tile_rect(13, 1, 1, 4));
        floor.walls.push(self.tile_rect(26, 7, 1, 4));
        floor.regions.push(self.tile_rect(3, 1, 35, 10));
        floor.stairs_center = floor.tile_to_world(TilePos::new(37, 5));
        floor.spawn = floor.tile_to_world(TilePos::new(2, 5));
        floor
    }

    fn room(&self) -> StaticFloor {
        let ts = self.tile_size;
        let mut floor = self.walled(30, 24);
        floor.wall_polygons.push(Polygon::new(vec![
            Vec2::new(14.0 * ts, 10.0 * ts),
            Vec2::new(17.0 * ts, 10.0 * ts),
            Vec2::new(17.0 * ts, 13.0 * ts),
        ]));
        floor.regions.push(self.tile_rect(1, 1, 12, 22));
        floor.region_polygons.push(Polygon::new(vec![
            Vec2::new(13.0 * ts, 1.0 * ts),
            Vec2::new(29.0 * ts, 1.0 * ts),
            Vec2::new(29.0 * ts, 23.0 * ts),
            Vec2::new(20.0 * ts, 23.0 * ts),
        ]));
        floor.stairs_center = floor.tile_to_world(TilePos::new(25, 4));
        floor.spawn = floor.tile_to_world(TilePos::new(3, 20));
        floor
    }

    fn bonus_room(&self) -> StaticFloor {
        let ts = self.tile_size;
        let mut floor = self.walled(24, 20);
        floor.region_polygons.push(Polygon::new(vec![
            Vec2::new(12.0 * ts, 1.0 * ts),
            Vec2::new(23.0 * ts, 10.0 * ts),
            Vec2::new(12.0 * ts, 19.0 * ts),
            Vec2::new(1.0 * ts, 10.0 * ts),
        ]));
        floor.stairs_center = floor.tile_to_world(TilePos::new(12, 10));
        floor.spawn = floor.tile_to_world(TilePos::new(2, 17));
        floor
    }
}

impl FloorLibrary for TemplateLibrary {
    fn load(&self, template: FloorTemplate) -> Result<StaticFloor, GeometryError> {
        let floor = match template {
            FloorTemplate::Entrance => self.entrance(),
            FloorTemplate::Corridor => self.corridor(),
            FloorTemplate::Room => self.room(),
            FloorTemplate::BonusRoom => self.bonus_room(),
        };
        floor.validate()?;
        Ok(floor)
    }
}
