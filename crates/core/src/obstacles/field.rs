use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::types::{Rect, TilePos, Vec2};

use super::kinds::{ObstacleKind, Resource, VisualVariant};

new_key_type! {
    pub struct ObstacleId;
}

/// One placed ore or rock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleNode {
    pub kind: ObstacleKind,
    pub hit_points: i32,
    pub footprint_tiles: u8,
    pub position: Vec2,
    pub tile: TilePos,
    pub variant: VisualVariant,
}

impl ObstacleNode {
    pub fn spawn(kind: ObstacleKind, tile: TilePos, position: Vec2, variant: VisualVariant) -> Self {
        let profile = kind.profile();
        Self {
            kind,
            hit_points: profile.hit_points,
            footprint_tiles: profile.footprint_tiles,
            position,
            tile,
            variant,
        }
    }

    /// Collision box: centred on x, sitting slightly above the node's y.
    pub fn footprint(&self, tile_size: f32) -> Rect {
        let profile = self.kind.profile();
        let width = profile.foot_width * tile_size;
        let height = profile.foot_height * tile_size;
        Rect::new(self.position.x - width * 0.5, self.position.y - height * 0.4, width, height)
    }

    pub fn collides(&self, pos: Vec2, radius: f32, tile_size: f32) -> bool {
        self.footprint(tile_size).intersects_circle(pos, radius)
    }

    pub fn is_destroyed(&self) -> bool {
        self.hit_points <= 0
    }

    /// Negative amounts count as zero.
    pub fn take_damage(&mut self, amount: i32) {
        self.hit_points -= amount.max(0);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSpec {
    pub resource: Resource,
    pub quantity: u32,
    pub tile: TilePos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileSurface {
    Soil,
}

/// Tile change the caller applies to its own map after a node breaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEdit {
    pub tile: TilePos,
    pub surface: TileSurface,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitOutcome {
    pub target: Option<ObstacleId>,
    pub destroyed: bool,
    pub remaining_hit_points: i32,
    pub drop: Option<DropSpec>,
    pub tile_edit: Option<TileEdit>,
}

impl HitOutcome {
    pub fn miss() -> Self {
        Self::default()
    }

    pub fn landed(&self) -> bool {
        self.target.is_some()
    }
}

/// Obstacle nodes of the current floor.
#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    nodes: SlotMap<ObstacleId, ObstacleNode>,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: ObstacleNode) -> ObstacleId {
        self.nodes.insert(node)
    }

    pub fn get(&self, id: ObstacleId) -> Option<&ObstacleNode> {
        self.nodes.get(id)
    }

    pub fn remove(&mut self, id: ObstacleId) -> Option<ObstacleNode> {
        self.nodes.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &ObstacleNode)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (ObstacleId, ObstacleNode)> + '_ {
        self.nodes.drain()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Nearest node to `pos`, if its centre lies within `radius`.
    pub fn find_nearest(&self, pos: Vec2, radius: f32) -> Option<ObstacleId> {
        let (id, distance_sq) = self
            .nodes
            .iter()
            .map(|(id, node)| (id, node.position.distance_squared(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        (distance_sq <= radius * radius).then_some(id)
    }

    /// Damages a node, removing it once its hit points reach zero. Stale ids miss.
    pub fn apply_damage(&mut self, id: ObstacleId, amount: i32) -> HitOutcome {
        let Some(node) = self.nodes.get_mut(id) else {
            return HitOutcome::miss();
        };
        node.take_damage(amount);
        if !node.is_destroyed() {
            return HitOutcome {
                target: Some(id),
                remaining_hit_points: node.hit_points,
                ..HitOutcome::default()
            };
        }

        let tile = node.tile;
        let resource = node.kind.drop();
        self.nodes.remove(id);
        HitOutcome {
            target: Some(id),
            destroyed: true,
            remaining_hit_points: 0,
            drop: Some(DropSpec { resource, quantity: 1, tile }),
            tile_edit: Some(TileEdit { tile, surface: TileSurface::Soil }),
        }
    }

    pub fn collides(&self, pos: Vec2, radius: f32, tile_size: f32) -> bool {
        self.nodes.values().any(|node| node.collides(pos, radius, tile_size))
    }

    pub fn occupies_tile(&self, tile: TilePos) -> bool {
        self.nodes.values().any(|node| node.tile == tile)
    }
}
