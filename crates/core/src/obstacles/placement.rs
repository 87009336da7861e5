use std::collections::HashSet;

use tracing::debug;

use crate::config::MineConfig;
use crate::geometry::FloorGeometry;
use crate::rng::MineRng;
use crate::stairs::StairMarker;
use crate::types::{Depth, TilePos, Vec2};

use super::field::ObstacleNode;
use super::kinds::{ObstacleKind, VisualVariant};

/// Every tile whose centre lies inside a minable region, in row-major order.
pub fn candidate_tiles<G: FloorGeometry + ?Sized>(geometry: &G) -> Vec<TilePos> {
    let (columns, rows) = geometry.grid_size();
    let mut tiles = Vec::new();
    for row in 0..rows {
        for col in 0..columns {
            let tile = TilePos::new(col, row);
            if geometry.region_contains(geometry.tile_to_world(tile)) {
                tiles.push(tile);
            }
        }
    }
    tiles
}

/// Shuffles and keeps `floor(len * density)` tiles, at most `cap`.
pub fn thin_candidates(
    mut tiles: Vec<TilePos>,
    density: f32,
    cap: usize,
    rng: &mut MineRng,
) -> Vec<TilePos> {
    rng.shuffle(&mut tiles);
    let keep = ((tiles.len() as f32 * density).floor() as usize).min(cap);
    tiles.truncate(keep);
    tiles
}

/// Turns candidate tiles into extra stairs and obstacle nodes for one depth.
pub struct PlacementEngine<'a, G: FloorGeometry + ?Sized> {
    geometry: &'a G,
    config: &'a MineConfig,
    depth: Depth,
    bottom_floor: bool,
}

impl<'a, G: FloorGeometry + ?Sized> PlacementEngine<'a, G> {
    pub fn new(geometry: &'a G, config: &'a MineConfig, depth: Depth) -> Self {
        Self { geometry, config, depth, bottom_floor: depth.is_bottom() }
    }

    pub fn with_bottom_floor(mut self, bottom_floor: bool) -> Self {
        self.bottom_floor = bottom_floor;
        self
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Takes a random count of stairs from the front of `candidates`.
    pub fn place_extra_stairs(
        &self,
        candidates: &[TilePos],
        min_count: usize,
        max_count: usize,
        rng: &mut MineRng,
    ) -> Vec<StairMarker> {
        if self.bottom_floor {
            return Vec::new();
        }
        let effective_max = max_count.min(candidates.len());
        let effective_min = min_count.min(effective_max);
        if effective_max == 0 || effective_min == 0 {
            return Vec::new();
        }

        let count = rng.range_inclusive(effective_min, effective_max);
        candidates[..count]
            .iter()
            .map(|&tile| StairMarker::new(self.geometry.tile_to_world(tile), tile))
            .collect()
    }

    /// Ore pass then rock pass over every candidate tile not holding a stair.
    pub fn generate_obstacles(
        &self,
        candidates: &[TilePos],
        stair_positions: &[Vec2],
        rng: &mut MineRng,
    ) -> Vec<ObstacleNode> {
        let stair_tiles: HashSet<TilePos> =
            stair_positions.iter().map(|&pos| self.geometry.world_to_tile(pos)).collect();

        let mut nodes = Vec::with_capacity(candidates.len());
        let mut ores = 0_usize;
        for &tile in candidates {
            if stair_tiles.contains(&tile) {
                continue;
            }
            let position = self.geometry.tile_to_world(tile);
            let (kind, variant) = match self.roll_ore(rng) {
                Some(ore) => {
                    ores += 1;
                    (ore, VisualVariant(0))
                }
                None => self.roll_rock(rng),
            };
            nodes.push(ObstacleNode::spawn(kind, tile, position, variant));
        }

        debug!(
            depth = self.depth.get(),
            candidates = candidates.len(),
            ores,
            rocks = nodes.len() - ores,
            "generated obstacles"
        );
        nodes
    }

    fn roll_ore(&self, rng: &mut MineRng) -> Option<ObstacleKind> {
        let ore = &self.config.ore;
        let depth = self.depth.get();
        let table = [
            (ObstacleKind::OreGold, ore.gold_min_depth, ore.gold_chance),
            (ObstacleKind::OreIron, ore.iron_min_depth, ore.iron_chance),
            (ObstacleKind::OreCopper, ore.copper_min_depth, ore.copper_chance),
        ];
        table
            .into_iter()
            .filter(|&(_, min_depth, _)| depth >= min_depth)
            .find(|&(_, _, chance)| rng.chance(chance))
            .map(|(kind, _, _)| kind)
    }

    fn roll_rock(&self, rng: &mut MineRng) -> (ObstacleKind, VisualVariant) {
        let roll = rng.unit();
        let kind = if roll < self.config.rocks.huge_below {
            ObstacleKind::RockHuge
        } else if roll < self.config.rocks.hard_below {
            ObstacleKind::RockHard
        } else {
            ObstacleKind::RockNormal
        };
        let variant_count = usize::from(kind.profile().variant_count);
        let variant = rng.range_inclusive(0, variant_count.saturating_sub(1));
        (kind, VisualVariant(variant as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FloorLibrary, FloorTemplate, StaticFloor, TemplateLibrary};
    use crate::types::Rect;

    fn open_floor(columns: i32, rows: i32) -> StaticFloor {
        StaticFloor {
            columns,
            rows,
            regions: vec![Rect::new(0.0, 0.0, columns as f32 * 16.0, rows as f32 * 16.0)],
            ..StaticFloor::empty(16.0)
        }
    }

    fn tiles(count: i32) -> Vec<TilePos> {
        (0..count).map(|col| TilePos::new(col, 0)).collect()
    }

    #[test]
    fn candidate_tiles_scan_rows_first() {
        let floor = open_floor(3, 2);
        assert_eq!(
            candidate_tiles(&floor),
            vec![
                TilePos::new(0, 0),
                TilePos::new(1, 0),
                TilePos::new(2, 0),
                TilePos::new(0, 1),
                TilePos::new(1, 1),
                TilePos::new(2, 1),
            ]
        );
        let entrance = TemplateLibrary::default().load(FloorTemplate::Entrance).expect("entrance");
        assert!(candidate_tiles(&entrance).is_empty());
    }

    #[test]
    fn thinning_keeps_density_share_under_cap() {
        let mut rng = MineRng::seeded(1);
        assert_eq!(thin_candidates(tiles(100), 0.3, 300, &mut rng).len(), 30);
        assert_eq!(thin_candidates(tiles(100), 0.3, 12, &mut rng).len(), 12);
        assert!(thin_candidates(Vec::new(), 0.3, 300, &mut rng).is_empty());
    }

    #[test]
    fn extra_stairs_are_a_prefix_snapped_to_tile_centres() {
        let floor = open_floor(10, 1);
        let config = MineConfig::default();
        let engine = PlacementEngine::new(&floor, &config, Depth::floor(3));
        let candidates = tiles(10);
        let mut rng = MineRng::seeded(9);
        for _ in 0..50 {
            let stairs = engine.place_extra_stairs(&candidates, 2, 5, &mut rng);
            assert!((2..=5).contains(&stairs.len()));
            for (marker, tile) in stairs.iter().zip(&candidates) {
                assert_eq!(marker.tile, *tile);
                assert_eq!(marker.position, floor.tile_to_world(*tile));
            }
        }
    }

    #[test]
    fn extra_stair_count_is_clamped_by_candidate_count() {
        let floor = open_floor(3, 1);
        let config = MineConfig::default();
        let engine = PlacementEngine::new(&floor, &config, Depth::floor(3));
        let mut rng = MineRng::seeded(2);
        for _ in 0..50 {
            let count = engine.place_extra_stairs(&tiles(3), 2, 4, &mut rng).len();
            assert!((2..=3).contains(&count), "got {count}");
        }
        assert_eq!(engine.place_extra_stairs(&tiles(1), 2, 4, &mut rng).len(), 1);
        assert!(engine.place_extra_stairs(&[], 2, 4, &mut rng).is_empty());
        assert!(engine.place_extra_stairs(&tiles(3), 0, 0, &mut rng).is_empty());
    }

    #[test]
    fn bottom_floor_never_gets_extra_stairs() {
        let floor = open_floor(20, 20);
        let config = MineConfig::default();
        let mut rng = MineRng::seeded(4);
        let bottom = PlacementEngine::new(&floor, &config, Depth::BOTTOM);
        assert!(bottom.place_extra_stairs(&candidate_tiles(&floor), 2, 5, &mut rng).is_empty());

        let flagged = PlacementEngine::new(&floor, &config, Depth::floor(7)).with_bottom_floor(true);
        assert!(flagged.place_extra_stairs(&candidate_tiles(&floor), 2, 5, &mut rng).is_empty());
    }

    #[test]
    fn obstacles_skip_stair_tiles() {
        let floor = open_floor(4, 1);
        let config = MineConfig::default();
        let engine = PlacementEngine::new(&floor, &config, Depth::floor(10));
        let stair = floor.tile_to_world(TilePos::new(1, 0));
        let mut rng = MineRng::seeded(6);

        let nodes = engine.generate_obstacles(&tiles(4), &[stair], &mut rng);
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|node| node.tile != TilePos::new(1, 0)));
    }

    #[test]
    fn certain_gold_wins_priority_once_unlocked() {
        let floor = open_floor(8, 1);
        let mut config = MineConfig::default();
        config.ore.gold_chance = 1.0;
        config.ore.iron_chance = 1.0;
        config.ore.copper_chance = 1.0;
        let mut rng = MineRng::seeded(8);

        let shallow = PlacementEngine::new(&floor, &config, Depth::floor(19));
        let kinds: HashSet<ObstacleKind> =
            shallow.generate_obstacles(&tiles(8), &[], &mut rng).iter().map(|n| n.kind).collect();
        assert_eq!(kinds, HashSet::from([ObstacleKind::OreCopper]));

        let iron_gate = PlacementEngine::new(&floor, &config, Depth::floor(20));
        let kinds: HashSet<ObstacleKind> =
            iron_gate.generate_obstacles(&tiles(8), &[], &mut rng).iter().map(|n| n.kind).collect();
        assert_eq!(kinds, HashSet::from([ObstacleKind::OreIron]));

        let middle = PlacementEngine::new(&floor, &config, Depth::floor(39));
        let kinds: HashSet<ObstacleKind> =
            middle.generate_obstacles(&tiles(8), &[], &mut rng).iter().map(|n| n.kind).collect();
        assert_eq!(kinds, HashSet::from([ObstacleKind::OreIron]));

        let deep = PlacementEngine::new(&floor, &config, Depth::floor(40));
        let kinds: HashSet<ObstacleKind> =
            deep.generate_obstacles(&tiles(8), &[], &mut rng).iter().map(|n| n.kind).collect();
        assert_eq!(kinds, HashSet::from([ObstacleKind::OreGold]));
    }

    #[test]
    fn rocks_fill_tiles_when_ores_never_hit() {
        let floor = open_floor(50, 1);
        let mut config = MineConfig::default();
        config.ore.copper_chance = 0.0;
        let engine = PlacementEngine::new(&floor, &config, Depth::floor(2));
        let mut rng = MineRng::seeded(21);

        let nodes = engine.generate_obstacles(&tiles(50), &[], &mut rng);
        assert_eq!(nodes.len(), 50);
        for node in &nodes {
            assert!(!node.kind.is_ore());
            assert!(node.variant.0 < node.kind.profile().variant_count);
            assert_eq!(node.hit_points, node.kind.profile().hit_points);
        }
    }
}
