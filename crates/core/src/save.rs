//! Versioned save blob for the mine: depth, unlocks and optionally the live floor layout.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::FloorTemplate;
use crate::obstacles::{ObstacleKind, VisualVariant};
use crate::progression::StoreError;
use crate::stairs::StairMarker;
use crate::types::{Depth, Vec2};

pub const SAVE_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedObstacle {
    pub kind: ObstacleKind,
    pub hit_points: i32,
    pub position: Vec2,
    #[serde(default)]
    pub variant: VisualVariant,
}

/// Obstacles and extra stairs of one floor, reinstalled verbatim on restore.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedLayout {
    pub depth: Depth,
    /// `None` rerolls the template for `depth`.
    pub template: Option<FloorTemplate>,
    pub obstacles: Vec<SavedObstacle>,
    pub extra_stairs: Vec<StairMarker>,
}

/// Missing fields fall back to defaults and unknown fields are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MineSave {
    pub format_version: u32,
    pub current_depth: Depth,
    pub elevator_depths: Vec<u8>,
    pub obstacle_layout: Option<SavedLayout>,
}

impl Default for MineSave {
    fn default() -> Self {
        Self {
            format_version: SAVE_FORMAT_VERSION,
            current_depth: Depth::ENTRANCE,
            elevator_depths: Vec::new(),
            obstacle_layout: None,
        }
    }
}

impl MineSave {
    pub fn to_json_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let save: Self = serde_json::from_str(json)?;
        if save.format_version > SAVE_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(save.format_version));
        }
        Ok(save)
    }

    pub fn write_atomic(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, self.to_json_string()?).map_err(io_err)?;
        fs::rename(&tmp_path, path).map_err(io_err)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)
            .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::TilePos;

    #[test]
    fn sparse_json_fills_defaults() {
        let save = MineSave::from_json_str(r#"{ "current_depth": 12, "extra": true }"#).unwrap();
        assert_eq!(save.format_version, SAVE_FORMAT_VERSION);
        assert_eq!(save.current_depth, Depth::floor(12));
        assert!(save.elevator_depths.is_empty());
        assert!(save.obstacle_layout.is_none());
    }

    #[test]
    fn newer_versions_are_refused() {
        let err = MineSave::from_json_str(r#"{ "format_version": 2 }"#).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedVersion(2)));
    }

    #[test]
    fn atomic_write_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saves").join("mine.json");
        let save = MineSave {
            current_depth: Depth::floor(44),
            elevator_depths: vec![5, 10, 40],
            obstacle_layout: Some(SavedLayout {
                depth: Depth::floor(44),
                template: Some(FloorTemplate::Corridor),
                obstacles: vec![SavedObstacle {
                    kind: ObstacleKind::OreGold,
                    hit_points: 1,
                    position: Vec2::new(24.0, 40.0),
                    variant: VisualVariant(0),
                }],
                extra_stairs: vec![StairMarker::new(Vec2::new(56.0, 56.0), TilePos::new(3, 3))],
            }),
            ..MineSave::default()
        };

        save.write_atomic(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(MineSave::load(&path).unwrap(), save);
    }
}
