//! Hooks for whatever draws obstacles and stairs.

use std::collections::HashMap;

use crate::obstacles::{ObstacleId, ObstacleKind, ObstacleNode, VisualVariant};
use crate::stairs::StairSet;
use crate::types::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct VisualRequest {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    pub variant: VisualVariant,
    pub position: Vec2,
    pub asset_key: String,
}

impl VisualRequest {
    pub fn for_node(id: ObstacleId, node: &ObstacleNode) -> Self {
        Self {
            id,
            kind: node.kind,
            variant: node.variant,
            position: node.position,
            asset_key: node.kind.asset_key(node.variant),
        }
    }
}

/// Receives one `attach` per created node and one `detach` per removed node.
pub trait VisualSink {
    fn attach(&mut self, request: VisualRequest);

    fn detach(&mut self, request: VisualRequest);

    fn stairs_changed(&mut self, _stairs: &StairSet) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl VisualSink for NullSink {
    fn attach(&mut self, _request: VisualRequest) {}

    fn detach(&mut self, _request: VisualRequest) {}
}

/// Tracks live visuals; handy for tools and tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    live: HashMap<ObstacleId, VisualRequest>,
    pub attached: usize,
    pub detached: usize,
    pub stair_updates: usize,
    pub extra_stairs_shown: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: ObstacleId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live(&self) -> impl Iterator<Item = &VisualRequest> {
        self.live.values()
    }
}

impl VisualSink for RecordingSink {
    fn attach(&mut self, request: VisualRequest) {
        self.attached += 1;
        self.live.insert(request.id, request);
    }

    fn detach(&mut self, request: VisualRequest) {
        self.detached += 1;
        self.live.remove(&request.id);
    }

    fn stairs_changed(&mut self, stairs: &StairSet) {
        self.stair_updates += 1;
        self.extra_stairs_shown = stairs.uncovered_extras().count();
    }
}

impl<V: VisualSink + ?Sized> VisualSink for &mut V {
    fn attach(&mut self, request: VisualRequest) {
        (**self).attach(request);
    }

    fn detach(&mut self, request: VisualRequest) {
        (**self).detach(request);
    }

    fn stairs_changed(&mut self, stairs: &StairSet) {
        (**self).stairs_changed(stairs);
    }
}
