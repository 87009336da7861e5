pub mod collision;
pub mod config;
pub mod floor;
pub mod geometry;
pub mod obstacles;
pub mod progression;
pub mod rng;
pub mod save;
pub mod stairs;
pub mod store_file;
pub mod types;
pub mod visuals;

pub use collision::{CollisionLayers, CollisionQuery, CollisionSource};
pub use config::{ConfigError, MineConfig, OreTable, RockTable};
pub use floor::{FloorManager, FloorState};
pub use geometry::{
    DirectoryLibrary, FloorGeometry, FloorLibrary, FloorTemplate, GeometryError, Polygon,
    StaticFloor, TemplateLibrary,
};
pub use obstacles::{
    DropSpec, HitOutcome, ObstacleField, ObstacleId, ObstacleKind, ObstacleNode, PlacementEngine,
    Resource, TileEdit, TileSurface, VisualVariant,
};
pub use progression::{MemoryStore, ProgressionLedger, ProgressionStore, StoreError};
pub use rng::MineRng;
pub use save::{MineSave, SavedLayout, SavedObstacle};
pub use stairs::{StairMarker, StairSet};
pub use store_file::JsonFileStore;
pub use types::*;
pub use visuals::{NullSink, RecordingSink, VisualRequest, VisualSink};
