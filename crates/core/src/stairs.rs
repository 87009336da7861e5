//! Main and procedurally added stair markers for the current floor.

use std::iter;

use serde::{Deserialize, Serialize};

use crate::obstacles::ObstacleField;
use crate::types::{TilePos, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StairMarker {
    pub position: Vec2,
    pub tile: TilePos,
    #[serde(default)]
    pub covered_by_obstacle: bool,
}

impl StairMarker {
    pub fn new(position: Vec2, tile: TilePos) -> Self {
        Self { position, tile, covered_by_obstacle: false }
    }

    fn within(&self, pos: Vec2, radius: f32) -> bool {
        self.position.distance_squared(pos) <= radius * radius
    }
}

impl Default for StairMarker {
    fn default() -> Self {
        Self::new(Vec2::ZERO, TilePos::new(0, 0))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StairSet {
    main: StairMarker,
    extras: Vec<StairMarker>,
}

impl StairSet {
    pub fn new(main: StairMarker) -> Self {
        Self { main, extras: Vec::new() }
    }

    pub fn main(&self) -> &StairMarker {
        &self.main
    }

    pub fn extras(&self) -> &[StairMarker] {
        &self.extras
    }

    pub fn set_extras(&mut self, extras: Vec<StairMarker>) {
        self.extras = extras;
    }

    pub fn clear_extras(&mut self) {
        self.extras.clear();
    }

    /// Main first, then extras in placement order.
    pub fn all_positions(&self) -> Vec<Vec2> {
        iter::once(self.main.position)
            .chain(self.extras.iter().map(|marker| marker.position))
            .collect()
    }

    /// Flags every marker whose tile holds an obstacle node.
    pub fn sync_coverage(&mut self, obstacles: &ObstacleField) {
        self.main.covered_by_obstacle = obstacles.occupies_tile(self.main.tile);
        for marker in &mut self.extras {
            marker.covered_by_obstacle = obstacles.occupies_tile(marker.tile);
        }
    }

    pub fn near_main(&self, pos: Vec2, radius: f32) -> bool {
        self.main.within(pos, radius)
    }

    /// Covered extra stairs do not count until the obstacle on them is cleared.
    pub fn near_extra(&self, pos: Vec2, radius: f32) -> bool {
        self.extras.iter().any(|marker| !marker.covered_by_obstacle && marker.within(pos, radius))
    }

    pub fn uncovered_extras(&self) -> impl Iterator<Item = &StairMarker> {
        self.extras.iter().filter(|marker| !marker.covered_by_obstacle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::{ObstacleKind, ObstacleNode, VisualVariant};

    fn marker(col: i32, row: i32) -> StairMarker {
        let position = Vec2::new((col as f32 + 0.5) * 16.0, (row as f32 + 0.5) * 16.0);
        StairMarker::new(position, TilePos::new(col, row))
    }

    #[test]
    fn near_checks_use_inclusive_radius() {
        let mut stairs = StairSet::new(marker(0, 0));
        stairs.set_extras(vec![marker(5, 0)]);
        assert!(stairs.near_main(Vec2::new(28.0, 8.0), 20.0));
        assert!(!stairs.near_main(Vec2::new(28.5, 8.0), 20.0));
        assert!(stairs.near_extra(Vec2::new(88.0, 20.0), 19.2));
        assert!(!stairs.near_extra(Vec2::new(8.0, 8.0), 19.2));
    }

    #[test]
    fn covered_extra_stairs_are_ignored_until_cleared() {
        let mut stairs = StairSet::new(marker(0, 0));
        stairs.set_extras(vec![marker(2, 2), marker(6, 2)]);
        let mut field = ObstacleField::new();
        let blocker = field.insert(ObstacleNode::spawn(
            ObstacleKind::RockNormal,
            TilePos::new(2, 2),
            marker(2, 2).position,
            VisualVariant(0),
        ));

        stairs.sync_coverage(&field);
        assert!(stairs.extras()[0].covered_by_obstacle);
        assert!(!stairs.extras()[1].covered_by_obstacle);
        assert!(!stairs.near_extra(marker(2, 2).position, 4.0));
        assert_eq!(stairs.uncovered_extras().count(), 1);

        field.remove(blocker);
        stairs.sync_coverage(&field);
        assert!(stairs.near_extra(marker(2, 2).position, 4.0));
    }

    #[test]
    fn all_positions_lists_main_first() {
        let mut stairs = StairSet::new(marker(1, 1));
        stairs.set_extras(vec![marker(3, 3)]);
        assert_eq!(stairs.all_positions(), vec![marker(1, 1).position, marker(3, 3).position]);
        stairs.clear_extras();
        assert_eq!(stairs.all_positions().len(), 1);
    }
}
