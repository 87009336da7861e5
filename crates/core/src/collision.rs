//! Layered collision over static walls, obstacle nodes and caller-supplied rectangles.

use crate::geometry::FloorGeometry;
use crate::obstacles::ObstacleField;
use crate::types::{Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionSource {
    Static,
    Obstacle,
    Dynamic,
    Monster,
}

/// Transient colliders owned by the caller and replaced wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionLayers {
    pub dynamic: Vec<Rect>,
    pub monsters: Vec<Rect>,
}

impl CollisionLayers {
    pub fn clear(&mut self) {
        self.dynamic.clear();
        self.monsters.clear();
    }
}

/// Borrowed view of every layer for one floor.
pub struct CollisionQuery<'a, G: FloorGeometry + ?Sized> {
    geometry: &'a G,
    obstacles: &'a ObstacleField,
    layers: &'a CollisionLayers,
    obstacle_radius_factor: f32,
}

impl<'a, G: FloorGeometry + ?Sized> CollisionQuery<'a, G> {
    pub fn new(
        geometry: &'a G,
        obstacles: &'a ObstacleField,
        layers: &'a CollisionLayers,
        obstacle_radius_factor: f32,
    ) -> Self {
        Self { geometry, obstacles, layers, obstacle_radius_factor }
    }

    /// First layer blocking a circle at `pos`, checked static, obstacle, dynamic, monster.
    pub fn blocking_source(
        &self,
        pos: Vec2,
        radius: f32,
        include_monsters: bool,
    ) -> Option<CollisionSource> {
        if self.geometry.static_collides(pos, radius) {
            return Some(CollisionSource::Static);
        }
        let obstacle_radius = radius * self.obstacle_radius_factor;
        if self.obstacles.collides(pos, obstacle_radius, self.geometry.tile_size()) {
            return Some(CollisionSource::Obstacle);
        }
        if self.layers.dynamic.iter().any(|rect| rect.contains(pos)) {
            return Some(CollisionSource::Dynamic);
        }
        if include_monsters && self.layers.monsters.iter().any(|rect| rect.contains(pos)) {
            return Some(CollisionSource::Monster);
        }
        None
    }

    pub fn collides(&self, pos: Vec2, radius: f32, include_monsters: bool) -> bool {
        self.blocking_source(pos, radius, include_monsters).is_some()
    }

    /// Clamps into the floor, then slides along whichever axis is open. Monsters never block.
    pub fn resolve_move(&self, current: Vec2, proposed: Vec2, radius: f32) -> Vec2 {
        self.resolve(current, proposed, radius, false)
    }

    /// Same slide, but monster rects block as well.
    pub fn resolve_move_with_monsters(&self, current: Vec2, proposed: Vec2, radius: f32) -> Vec2 {
        self.resolve(current, proposed, radius, true)
    }

    /// Each axis is tested from `current` on its own; the two results are then combined.
    fn resolve(&self, current: Vec2, proposed: Vec2, radius: f32, include_monsters: bool) -> Vec2 {
        let target = self.clamp_to_bounds(proposed);

        let mut resolved = current;
        if !self.collides(Vec2::new(target.x, current.y), radius, include_monsters) {
            resolved.x = target.x;
        }
        if !self.collides(Vec2::new(current.x, target.y), radius, include_monsters) {
            resolved.y = target.y;
        }
        resolved
    }

    /// Keeps a half-tile margin from the content edge; floors smaller than a tile are not clamped.
    pub fn clamp_to_bounds(&self, pos: Vec2) -> Vec2 {
        let half = self.geometry.tile_size() * 0.5;
        let size = self.geometry.content_size();
        let clamp_axis = |value: f32, extent: f32| {
            if extent - half < half { value } else { value.clamp(half, extent - half) }
        };
        Vec2::new(clamp_axis(pos.x, size.x), clamp_axis(pos.y, size.y))
    }
}
