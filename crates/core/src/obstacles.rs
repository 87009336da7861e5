//! Destructible ore and rock nodes: per-kind capability table, live field, placement.

mod field;
mod kinds;
mod placement;

pub use field::{DropSpec, HitOutcome, ObstacleField, ObstacleId, ObstacleNode, TileEdit, TileSurface};
pub use kinds::{KindProfile, ObstacleKind, Resource, VisualVariant};
pub use placement::{PlacementEngine, candidate_tiles, thin_candidates};
