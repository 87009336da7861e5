//! Order-independent layout fingerprint for reproducibility checks.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

impl<L: FloorLibrary, S: ProgressionStore, V: VisualSink> FloorManager<L, S, V> {
    /// Hash of depth, template, every node and every extra stair. Slot order does not matter.
    pub fn layout_fingerprint(&self) -> u64 {
        let mut nodes: Vec<&ObstacleNode> = self.obstacles.iter().map(|(_, node)| node).collect();
        nodes.sort_by_key(|node| (node.tile, node.kind));

        let mut hasher = Xxh3::new();
        hasher.write_u8(self.depth.get());
        hasher.write(self.template.name().as_bytes());
        hasher.write_u64(nodes.len() as u64);
        for node in nodes {
            hasher.write_i32(node.tile.col);
            hasher.write_i32(node.tile.row);
            hasher.write_u8(node.kind as u8);
            hasher.write_u8(node.variant.0);
            hasher.write_i32(node.hit_points);
        }
        for marker in self.stairs.extras() {
            hasher.write_i32(marker.tile.col);
            hasher.write_i32(marker.tile.row);
        }
        hasher.finish()
    }
}
