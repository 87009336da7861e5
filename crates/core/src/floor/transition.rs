//! Teardown of the old floor and installation of the new one.
//! Everything here runs inside a single transition call; nothing is observable half-done.

use tracing::warn;

use super::*;
use crate::obstacles::{PlacementEngine, candidate_tiles, thin_candidates};
use crate::rng::MineRng;
use crate::stairs::StairMarker;

impl<L: FloorLibrary, S: ProgressionStore, V: VisualSink> FloorManager<L, S, V> {
    pub(super) fn enter_floor(&mut self, depth: Depth, layout: Option<&SavedLayout>) {
        self.teardown();
        self.depth = depth;
        self.bottom_floor = self.library.is_bottom_floor(depth);

        let mut rng = MineRng::for_floor(self.config.seed, depth);
        let rolled = FloorTemplate::for_depth(depth, &mut rng);
        self.template = layout.and_then(|saved| saved.template).unwrap_or(rolled);
        self.geometry = self.load_geometry(self.template);

        match layout {
            Some(saved) => self.install_saved(saved),
            None => self.generate_layout(&mut rng),
        }

        self.ledger.record_visit(depth);
        self.ledger.record_current_depth(depth);
        info!(
            depth = depth.get(),
            theme = ?self.current_theme(),
            template = self.template.name(),
            obstacles = self.obstacles.len(),
            extra_stairs = self.stairs.extras().len(),
            restored = layout.is_some(),
            "entered mine floor"
        );
    }

    /// Drops every piece of per-floor state; the ledger is untouched.
    pub(super) fn teardown(&mut self) {
        let visuals = &mut self.visuals;
        for (id, node) in self.obstacles.drain() {
            visuals.detach(VisualRequest::for_node(id, &node));
        }
        self.stairs.clear_extras();
        self.layers.clear();
        self.cursor = None;
    }

    pub(super) fn load_geometry(&self, template: FloorTemplate) -> StaticFloor {
        match self.library.load(template) {
            Ok(floor) => floor,
            Err(err) => {
                warn!(
                    depth = self.depth.get(),
                    template = template.name(),
                    error = %err,
                    "floor geometry unavailable; using an empty floor"
                );
                StaticFloor::empty(self.config.tile_size)
            }
        }
    }

    pub(super) fn install_stairs(&mut self, extras: Vec<StairMarker>) {
        let center = self.geometry.main_stairs_center();
        self.stairs = StairSet::new(StairMarker::new(center, self.geometry.world_to_tile(center)));
        self.stairs.set_extras(extras);
        self.stairs.sync_coverage(&self.obstacles);
        self.visuals.stairs_changed(&self.stairs);
    }

    fn install_nodes(&mut self, nodes: Vec<ObstacleNode>) {
        for node in nodes {
            let id = self.obstacles.insert(node);
            if let Some(node) = self.obstacles.get(id) {
                self.visuals.attach(VisualRequest::for_node(id, node));
            }
        }
    }

    fn generate_layout(&mut self, rng: &mut MineRng) {
        let candidates = thin_candidates(
            candidate_tiles(&self.geometry),
            self.config.candidate_density,
            self.config.candidate_cap,
            rng,
        );
        let engine = PlacementEngine::new(&self.geometry, &self.config, self.depth)
            .with_bottom_floor(self.bottom_floor);
        let extras = engine.place_extra_stairs(
            &candidates,
            self.config.extra_stairs_min,
            self.config.extra_stairs_max,
            rng,
        );

        let mut stair_positions = vec![self.geometry.main_stairs_center()];
        stair_positions.extend(extras.iter().map(|marker| marker.position));
        let nodes = engine.generate_obstacles(&candidates, &stair_positions, rng);

        self.install_nodes(nodes);
        self.install_stairs(extras);
    }

    fn install_saved(&mut self, layout: &SavedLayout) {
        let nodes: Vec<ObstacleNode> = layout
            .obstacles
            .iter()
            .filter(|saved| saved.hit_points > 0)
            .map(|saved| {
                let tile = self.geometry.world_to_tile(saved.position);
                let mut node = ObstacleNode::spawn(saved.kind, tile, saved.position, saved.variant);
                node.hit_points = saved.hit_points;
                node
            })
            .collect();
        self.install_nodes(nodes);
        self.install_stairs(layout.extra_stairs.clone());
    }
}
