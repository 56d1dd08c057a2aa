// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Declarative level loading.
//!
//! A level is a RON [`LevelDefinition`] listing assets, an optional tilemap and entities.
//! The loader populates a [`Registry`] only through entity creation, component
//! attachment, tags and groups; loaded entities become visible to systems at the next
//! commit like any other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sable_core::math::Vec2;
use sable_data::ecs::{Entity, Registry};
use sable_data::EcsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{
    Animation, BoxCollider, CameraFollow, Health, KeyboardControlled, ProjectileEmitter, RigidBody,
    Script, Sprite, TextLabel, Transform,
};
use crate::script::ScriptLibrary;

/// Errors raised while loading a level.
#[derive(Error, Debug)]
pub enum LevelError {
    /// A level or tilemap file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The level text is not a valid [`LevelDefinition`].
    #[error("invalid level definition: {0}")]
    Parse(String),
    /// The level declares a tilemap but no tilemap text was provided.
    #[error("the level declares a tilemap but none was provided")]
    MissingTilemap,
    /// A tilemap cell is malformed or missing.
    #[error("tilemap error at row {row}, column {col}: {reason}")]
    Tilemap {
        /// Zero-based row.
        row: usize,
        /// Zero-based column.
        col: usize,
        /// What is wrong with the cell.
        reason: String,
    },
    /// An entity references a script the loader does not know.
    #[error("unknown script `{0}`")]
    UnknownScript(String),
    /// The registry rejected an operation.
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// The kind of an asset declared by a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetKind {
    /// An image.
    Texture,
    /// A font rendered at `size` points.
    Font {
        /// Point size.
        size: u32,
    },
}

/// An asset the renderer should load for the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDefinition {
    /// Id components refer to.
    pub id: String,
    /// What the file contains.
    pub kind: AssetKind,
    /// File to load.
    pub file: PathBuf,
}

fn default_scale() -> f32 {
    1.0
}

/// A grid of tiles cut from one texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilemapDefinition {
    /// Map text file, relative to the level file.
    pub map_file: PathBuf,
    /// Texture holding the tiles.
    pub texture_asset_id: String,
    /// Number of tile rows.
    pub num_rows: usize,
    /// Number of tile columns.
    pub num_cols: usize,
    /// Tile edge in texture pixels.
    pub tile_size: u32,
    /// Scale applied to every tile.
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_z_index() -> i32 {
    1
}

/// Level-file form of a [`Sprite`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteDefinition {
    /// Texture asset id.
    pub asset_id: String,
    /// Width in texture pixels.
    pub width: u32,
    /// Height in texture pixels.
    pub height: u32,
    /// Draw order.
    #[serde(default = "default_z_index")]
    pub z_index: i32,
    /// Ignores the camera.
    #[serde(default)]
    pub is_fixed: bool,
    /// Horizontal offset of the source region.
    #[serde(default)]
    pub src_rect_x: f32,
    /// Vertical offset of the source region.
    #[serde(default)]
    pub src_rect_y: f32,
}

impl From<&SpriteDefinition> for Sprite {
    fn from(def: &SpriteDefinition) -> Self {
        let mut sprite = Sprite::new(def.asset_id.clone(), def.width, def.height, def.z_index)
            .with_source_offset(def.src_rect_x, def.src_rect_y);
        sprite.is_fixed = def.is_fixed;
        sprite
    }
}

/// One component of an entity in a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentDefinition {
    /// A [`Transform`].
    Transform(Transform),
    /// A [`RigidBody`].
    RigidBody(RigidBody),
    /// A [`Sprite`].
    Sprite(SpriteDefinition),
    /// An [`Animation`].
    Animation(Animation),
    /// A [`BoxCollider`].
    BoxCollider(BoxCollider),
    /// A [`Health`].
    Health(Health),
    /// A [`ProjectileEmitter`].
    ProjectileEmitter(ProjectileEmitter),
    /// A [`KeyboardControlled`].
    KeyboardControlled(KeyboardControlled),
    /// A [`CameraFollow`].
    CameraFollow,
    /// A [`TextLabel`].
    TextLabel(TextLabel),
    /// A [`Script`], by name in the loader's [`ScriptLibrary`].
    Script(String),
}

/// One entity in a level file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDefinition {
    /// Unique tag.
    pub tag: Option<String>,
    /// Group name.
    pub group: Option<String>,
    /// Components to attach, in order.
    pub components: Vec<ComponentDefinition>,
}

/// The root of a level file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDefinition {
    /// Assets to load.
    pub assets: Vec<AssetDefinition>,
    /// Optional background tilemap.
    pub tilemap: Option<TilemapDefinition>,
    /// Entities to create.
    pub entities: Vec<EntityDefinition>,
}

impl LevelDefinition {
    /// Parses a level from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, LevelError> {
        ron::from_str(text).map_err(|e| LevelError::Parse(e.to_string()))
    }
}

/// What a load produced.
#[derive(Debug, Clone, Default)]
pub struct LoadedLevel {
    /// Size of the map in world pixels. Zero without a tilemap.
    pub map_size: Vec2,
    /// Number of tile entities created.
    pub tiles: usize,
    /// Entities created from [`LevelDefinition::entities`], in order.
    pub entities: Vec<Entity>,
    /// Declared assets by id.
    pub assets: HashMap<String, AssetDefinition>,
}

/// Parses tilemap text into `(source row, source column)` pairs, one row per line.
///
/// Each cell holds two digits: the row then the column of the tile in the texture.
/// Cells are separated by commas. Extra rows or columns are ignored.
pub fn parse_tilemap(
    text: &str,
    num_rows: usize,
    num_cols: usize,
) -> Result<Vec<Vec<(u32, u32)>>, LevelError> {
    // Declared dimensions come from the level file, so only the text bounds allocation.
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let mut grid = Vec::with_capacity(num_rows.min(lines.len()));

    for row in 0..num_rows {
        let line = lines.get(row).copied().ok_or_else(|| LevelError::Tilemap {
            row,
            col: 0,
            reason: "missing row".to_string(),
        })?;
        let mut cells = line.split(',').map(str::trim);
        let mut parsed = Vec::new();
        for col in 0..num_cols {
            let cell = cells.next().unwrap_or_default();
            let tilemap_error = |reason: String| LevelError::Tilemap { row, col, reason };
            let digits: Vec<u32> = cell.chars().filter_map(|c| c.to_digit(10)).collect();
            if cell.is_empty() {
                return Err(tilemap_error("missing cell".to_string()));
            }
            if cell.len() != 2 || digits.len() != 2 {
                return Err(tilemap_error(format!("expected two digits, found `{cell}`")));
            }
            parsed.push((digits[0], digits[1]));
        }
        grid.push(parsed);
    }
    Ok(grid)
}

/// Populates registries from [`LevelDefinition`]s.
#[derive(Debug, Clone, Default)]
pub struct LevelLoader {
    scripts: ScriptLibrary,
}

impl LevelLoader {
    /// Creates a loader resolving script names against `scripts`.
    pub fn new(scripts: ScriptLibrary) -> Self {
        Self { scripts }
    }

    /// The scripts levels may reference.
    pub fn scripts(&self) -> &ScriptLibrary {
        &self.scripts
    }

    /// The scripts levels may reference, for registration.
    pub fn scripts_mut(&mut self) -> &mut ScriptLibrary {
        &mut self.scripts
    }

    /// Reads the level at `path` and the tilemap it references, then loads them.
    ///
    /// The tilemap path is resolved relative to the level file.
    pub fn load_file(&self, registry: &mut Registry, path: impl AsRef<Path>) -> Result<LoadedLevel, LevelError> {
        let path = path.as_ref();
        let definition = LevelDefinition::from_ron_str(&read(path)?)?;
        let tilemap_text = match &definition.tilemap {
            Some(tilemap) => {
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                Some(read(&base.join(&tilemap.map_file))?)
            }
            None => None,
        };
        log::info!("Loading level {}", path.display());
        self.load(registry, &definition, tilemap_text.as_deref())
    }

    /// Creates the tiles and entities described by `definition`.
    ///
    /// Tilemap text and script names are validated before any entity is created.
    pub fn load(
        &self,
        registry: &mut Registry,
        definition: &LevelDefinition,
        tilemap_text: Option<&str>,
    ) -> Result<LoadedLevel, LevelError> {
        let grid = match (&definition.tilemap, tilemap_text) {
            (Some(tilemap), Some(text)) => Some(parse_tilemap(text, tilemap.num_rows, tilemap.num_cols)?),
            (Some(_), None) => return Err(LevelError::MissingTilemap),
            (None, _) => None,
        };
        for entity in &definition.entities {
            for component in &entity.components {
                if let ComponentDefinition::Script(name) = component {
                    if self.scripts.get(name).is_none() {
                        return Err(LevelError::UnknownScript(name.clone()));
                    }
                }
            }
        }

        let mut loaded = LoadedLevel {
            assets: definition
                .assets
                .iter()
                .map(|asset| (asset.id.clone(), asset.clone()))
                .collect(),
            ..LoadedLevel::default()
        };

        if let (Some(tilemap), Some(grid)) = (&definition.tilemap, grid) {
            let tile = tilemap.tile_size as f32;
            let step = tile * tilemap.scale;
            for (y, row) in grid.iter().enumerate() {
                for (x, &(src_row, src_col)) in row.iter().enumerate() {
                    registry
                        .spawn()
                        .add_component(Transform {
                            position: Vec2::new(x as f32 * step, y as f32 * step),
                            scale: Vec2::new(tilemap.scale, tilemap.scale),
                            rotation: 0.0,
                        })?
                        .add_component(
                            Sprite::new(tilemap.texture_asset_id.clone(), tilemap.tile_size, tilemap.tile_size, 0)
                                .with_source_offset(src_col as f32 * tile, src_row as f32 * tile),
                        )?;
                    loaded.tiles += 1;
                }
            }
            loaded.map_size = Vec2::new(tilemap.num_cols as f32 * step, tilemap.num_rows as f32 * step);
        }

        for entity_def in &definition.entities {
            let id = self.spawn_entity(registry, entity_def, &loaded)?;
            loaded.entities.push(id);
        }

        log::info!(
            "Level loaded: {} tiles, {} entities, map {}x{}",
            loaded.tiles,
            loaded.entities.len(),
            loaded.map_size.x,
            loaded.map_size.y
        );
        Ok(loaded)
    }

    fn spawn_entity(
        &self,
        registry: &mut Registry,
        definition: &EntityDefinition,
        loaded: &LoadedLevel,
    ) -> Result<Entity, LevelError> {
        let mut entity = registry.spawn();
        if let Some(tag) = &definition.tag {
            entity.tag(tag.clone())?;
        }
        if let Some(group) = &definition.group {
            entity.group(group.clone())?;
        }

        for component in &definition.components {
            match component {
                ComponentDefinition::Transform(c) => entity.add_component(*c)?,
                ComponentDefinition::RigidBody(c) => entity.add_component(*c)?,
                ComponentDefinition::Sprite(def) => {
                    if !loaded.assets.contains_key(&def.asset_id) {
                        log::debug!("Sprite references undeclared asset `{}`", def.asset_id);
                    }
                    entity.add_component(Sprite::from(def))?
                }
                ComponentDefinition::Animation(c) => entity.add_component(*c)?,
                ComponentDefinition::BoxCollider(c) => entity.add_component(*c)?,
                ComponentDefinition::Health(c) => entity.add_component(*c)?,
                ComponentDefinition::ProjectileEmitter(c) => entity.add_component(*c)?,
                ComponentDefinition::KeyboardControlled(c) => entity.add_component(*c)?,
                ComponentDefinition::CameraFollow => entity.add_component(CameraFollow)?,
                ComponentDefinition::TextLabel(c) => entity.add_component(c.clone())?,
                ComponentDefinition::Script(name) => match self.scripts.get(name) {
                    Some(on_update) => entity.add_component(Script::new(on_update))?,
                    None => return Err(LevelError::UnknownScript(name.clone())),
                },
            };
        }
        Ok(entity.id())
    }
}

fn read(path: &Path) -> Result<String, LevelError> {
    std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilemap_cells_are_row_then_column_digits() {
        let grid = parse_tilemap("21,05\n 10 , 00 \n", 2, 2).unwrap();
        assert_eq!(grid, vec![vec![(2, 1), (0, 5)], vec![(1, 0), (0, 0)]]);
    }

    #[test]
    fn malformed_tilemap_reports_the_cell() {
        match parse_tilemap("21,0x\n", 1, 2) {
            Err(LevelError::Tilemap { row, col, .. }) => assert_eq!((row, col), (0, 1)),
            other => panic!("unexpected result: {other:?}"),
        }
        match parse_tilemap("21,05\n", 2, 2) {
            Err(LevelError::Tilemap { row, .. }) => assert_eq!(row, 1),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            parse_tilemap("21\n", 1, 2),
            Err(LevelError::Tilemap { col: 1, .. })
        ));
    }

    #[test]
    fn sprite_definition_defaults() {
        let def: SpriteDefinition =
            ron::from_str(r#"(asset_id: "tree", width: 16, height: 32)"#).unwrap();
        let sprite = Sprite::from(&def);
        assert_eq!(sprite.z_index, 1);
        assert_eq!(sprite.src_rect.w, 16.0);
        assert!(!sprite.is_fixed);
    }
}
