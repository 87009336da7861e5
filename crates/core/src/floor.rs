//! Current-floor authority: depth, theme, transitions, and the per-floor obstacle and stair state.
//! Floor changes tear down everything transient, load geometry, then generate or restore a layout.
//! The elevator ledger is the only state that outlives a floor.

mod hash;
mod transition;

use tracing::{debug, info, warn};

use crate::collision::{CollisionLayers, CollisionQuery, CollisionSource};
use crate::config::MineConfig;
use crate::geometry::{FloorGeometry, FloorLibrary, FloorTemplate, StaticFloor};
use crate::obstacles::{HitOutcome, ObstacleField, ObstacleId, ObstacleNode};
use crate::progression::{ProgressionLedger, ProgressionStore};
use crate::save::{MineSave, SavedLayout, SavedObstacle};
use crate::stairs::StairSet;
use crate::types::{Depth, FIRST_FLOOR, Rect, Theme, TilePos, Vec2};
use crate::visuals::{VisualRequest, VisualSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloorState {
    Entrance,
    Floor(Depth),
}

pub struct FloorManager<L: FloorLibrary, S: ProgressionStore, V: VisualSink> {
    config: MineConfig,
    library: L,
    ledger: ProgressionLedger<S>,
    visuals: V,
    depth: Depth,
    template: FloorTemplate,
    geometry: StaticFloor,
    obstacles: ObstacleField,
    stairs: StairSet,
    layers: CollisionLayers,
    cursor: Option<TilePos>,
    bottom_floor: bool,
}

impl<L: FloorLibrary, S: ProgressionStore, V: VisualSink> FloorManager<L, S, V> {
    /// Opens the ledger from `store` and starts at the entrance.
    pub fn new(config: MineConfig, library: L, store: S, visuals: V) -> Self {
        let geometry = StaticFloor::empty(config.tile_size);
        let mut manager = Self {
            config,
            library,
            ledger: ProgressionLedger::open(store),
            visuals,
            depth: Depth::ENTRANCE,
            template: FloorTemplate::Entrance,
            geometry,
            obstacles: ObstacleField::new(),
            stairs: StairSet::default(),
            layers: CollisionLayers::default(),
            cursor: None,
            bottom_floor: false,
        };
        manager.load_entrance();
        manager
    }

    // ---- transitions ----

    /// Moves to `target`, clamped into `1..=120`, with a freshly generated layout.
    pub fn go_to_depth(&mut self, target: i32) {
        let depth = Depth::floor(target);
        self.enter_floor(depth, None);
    }

    /// Moves to `target` and reinstalls `layout` instead of generating one.
    /// A layout saved for another depth is ignored and the floor is generated.
    pub fn go_to_depth_with_layout(&mut self, target: i32, layout: &SavedLayout) {
        let depth = Depth::floor(target);
        if layout.depth != depth {
            warn!(
                depth = depth.get(),
                layout_depth = layout.depth.get(),
                "saved layout belongs to another depth; generating instead"
            );
            self.enter_floor(depth, None);
            return;
        }
        self.enter_floor(depth, Some(layout));
    }

    /// From the entrance always lands on floor 1; elsewhere moves `n` floors down.
    pub fn descend_by(&mut self, n: i32) {
        if self.depth.is_entrance() {
            self.go_to_depth(i32::from(FIRST_FLOOR));
        } else {
            self.go_to_depth(i32::from(self.depth).saturating_add(n));
        }
    }

    pub fn load_entrance(&mut self) {
        self.teardown();
        self.depth = Depth::ENTRANCE;
        self.template = FloorTemplate::Entrance;
        self.bottom_floor = false;
        self.geometry = self.load_geometry(FloorTemplate::Entrance);
        self.install_stairs(Vec::new());
        self.ledger.record_current_depth(self.depth);
        info!(template = self.template.name(), "entered mine entrance");
    }

    // ---- floor queries ----

    pub fn current_depth(&self) -> Depth {
        self.depth
    }

    pub fn state(&self) -> FloorState {
        if self.depth.is_entrance() { FloorState::Entrance } else { FloorState::Floor(self.depth) }
    }

    pub fn current_theme(&self) -> Theme {
        self.depth.theme()
    }

    pub fn template(&self) -> FloorTemplate {
        self.template
    }

    pub fn is_near_main_stairs(&self, pos: Vec2) -> bool {
        self.stairs.near_main(pos, self.stairs_radius())
    }

    pub fn is_near_extra_stairs(&self, pos: Vec2) -> bool {
        self.stairs.near_extra(pos, self.stairs_radius())
    }

    pub fn is_at_bottom_floor(&self) -> bool {
        self.bottom_floor
    }

    pub fn geometry(&self) -> &StaticFloor {
        &self.geometry
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.geometry.spawn_point()
    }

    pub fn stairs(&self) -> &StairSet {
        &self.stairs
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    pub fn config(&self) -> &MineConfig {
        &self.config
    }

    // ---- collision ----

    pub fn collides(&self, pos: Vec2, radius: f32, include_monsters: bool) -> bool {
        self.collision().collides(pos, radius, include_monsters)
    }

    pub fn blocking_source(
        &self,
        pos: Vec2,
        radius: f32,
        include_monsters: bool,
    ) -> Option<CollisionSource> {
        self.collision().blocking_source(pos, radius, include_monsters)
    }

    /// Player movement: static, obstacle and dynamic layers only.
    pub fn resolve_move(&self, current: Vec2, proposed: Vec2, radius: f32) -> Vec2 {
        self.collision().resolve_move(current, proposed, radius)
    }

    pub fn resolve_move_with_monsters(&self, current: Vec2, proposed: Vec2, radius: f32) -> Vec2 {
        self.collision().resolve_move_with_monsters(current, proposed, radius)
    }

    pub fn set_dynamic_colliders(&mut self, rects: Vec<Rect>) {
        self.layers.dynamic = rects;
    }

    pub fn set_monster_colliders(&mut self, rects: Vec<Rect>) {
        self.layers.monsters = rects;
    }

    fn collision(&self) -> CollisionQuery<'_, StaticFloor> {
        CollisionQuery::new(
            &self.geometry,
            &self.obstacles,
            &self.layers,
            self.config.obstacle_radius_factor,
        )
    }

    // ---- obstacles ----

    pub fn find_nearest_node(&self, pos: Vec2, radius: f32) -> Option<ObstacleId> {
        self.obstacles.find_nearest(pos, radius)
    }

    pub fn node(&self, id: ObstacleId) -> Option<&ObstacleNode> {
        self.obstacles.get(id)
    }

    /// Damages `id`; a destroyed node loses its visual and may uncover a stair.
    pub fn apply_damage(&mut self, id: ObstacleId, amount: i32) -> HitOutcome {
        let Some(node) = self.obstacles.get(id) else {
            debug!(?id, "damage to missing obstacle ignored");
            return HitOutcome::miss();
        };
        let request = VisualRequest::for_node(id, node);
        let outcome = self.obstacles.apply_damage(id, amount);
        if outcome.destroyed {
            debug!(kind = ?request.kind, tile = ?outcome.tile_edit.map(|edit| edit.tile), "obstacle destroyed");
            self.visuals.detach(request);
            self.stairs.sync_coverage(&self.obstacles);
            self.visuals.stairs_changed(&self.stairs);
        }
        outcome
    }

    /// Swing at `pos`: the nearest node within the hit radius takes `power` damage.
    pub fn strike(&mut self, pos: Vec2, power: i32) -> HitOutcome {
        match self.find_nearest_node(pos, self.hit_radius()) {
            Some(id) => self.apply_damage(id, power),
            None => HitOutcome::miss(),
        }
    }

    fn hit_radius(&self) -> f32 {
        self.geometry.tile_size() * self.config.hit_radius_factor
    }

    fn stairs_radius(&self) -> f32 {
        self.geometry.tile_size() * self.config.stairs_radius_factor
    }

    // ---- selection ----

    pub fn set_cursor(&mut self, tile: Option<TilePos>) {
        self.cursor = tile;
    }

    pub fn cursor(&self) -> Option<TilePos> {
        self.cursor
    }

    // ---- progression and saves ----

    pub fn unlocked_depths(&self) -> Vec<u8> {
        self.ledger.unlocked_depths()
    }

    pub fn ledger(&self) -> &ProgressionLedger<S> {
        &self.ledger
    }

    /// New game: clears unlocks and returns to the entrance.
    pub fn reset_progress(&mut self) {
        self.ledger.reset();
        self.load_entrance();
    }

    /// Captures depth and unlocks, plus the live layout when `include_layout` is set.
    pub fn snapshot(&self, include_layout: bool) -> MineSave {
        let obstacle_layout = (include_layout && !self.depth.is_entrance()).then(|| SavedLayout {
            depth: self.depth,
            template: Some(self.template),
            obstacles: self
                .obstacles
                .iter()
                .map(|(_, node)| SavedObstacle {
                    kind: node.kind,
                    hit_points: node.hit_points,
                    position: node.position,
                    variant: node.variant,
                })
                .collect(),
            extra_stairs: self.stairs.extras().to_vec(),
        });
        MineSave {
            current_depth: self.depth,
            elevator_depths: self.ledger.unlocked_depths(),
            obstacle_layout,
            ..MineSave::default()
        }
    }

    /// Reinstates a save: unlocks first, then the saved depth with its layout if one matches.
    pub fn restore(&mut self, save: &MineSave) {
        self.ledger.restore(&save.elevator_depths);
        let depth = Depth::clamped(i32::from(save.current_depth));
        match &save.obstacle_layout {
            _ if depth.is_entrance() => self.load_entrance(),
            Some(layout) if layout.depth == depth => {
                self.go_to_depth_with_layout(i32::from(depth), layout);
            }
            _ => self.go_to_depth(i32::from(depth)),
        }
    }

    // ---- collaborators ----

    pub fn visuals(&self) -> &V {
        &self.visuals
    }

    pub fn visuals_mut(&mut self) -> &mut V {
        &mut self.visuals
    }

    pub fn library(&self) -> &L {
        &self.library
    }
}
