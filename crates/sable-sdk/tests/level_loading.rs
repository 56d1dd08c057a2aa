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

//! Integration tests for declarative level loading.

use anyhow::Result;
use sable_sdk::level::{AssetKind, LevelError};
use sable_sdk::prelude::*;
use sable_sdk::script::{set_entity_velocity, ScriptLibrary};
use sable_sdk::tags;
use tempfile::tempdir;

const LEVEL: &str = r#"
(
    assets: [
        (id: "jungle-map", kind: Texture, file: "tilemaps/jungle.png"),
        (id: "tank-image", kind: Texture, file: "images/tank.png"),
        (id: "charriot-font", kind: Font(size: 20), file: "fonts/charriot.ttf"),
    ],
    tilemap: Some((
        map_file: "jungle.map",
        texture_asset_id: "jungle-map",
        num_rows: 2,
        num_cols: 3,
        tile_size: 32,
        scale: 2.0,
    )),
    entities: [
        (
            tag: Some("player"),
            components: [
                Transform((position: (x: 10.0, y: 20.0))),
                RigidBody((velocity: (x: 0.0, y: 0.0))),
                Sprite((asset_id: "chopper-image", width: 32, height: 32, z_index: 4)),
                BoxCollider((width: 32.0, height: 32.0)),
                Health((health_percentage: 100)),
                KeyboardControlled((
                    up_velocity: (x: 0.0, y: -80.0),
                    right_velocity: (x: 80.0, y: 0.0),
                    down_velocity: (x: 0.0, y: 80.0),
                    left_velocity: (x: -80.0, y: 0.0),
                )),
                CameraFollow,
            ],
        ),
        (
            group: Some("enemies"),
            components: [
                Transform((position: (x: 100.0, y: 50.0), rotation: 90.0)),
                Sprite((asset_id: "tank-image", width: 32, height: 32, src_rect_y: 32.0)),
                Animation((num_frames: 2, frame_speed_rate: 5)),
                ProjectileEmitter((projectile_velocity: (x: 100.0, y: 0.0), repeat_frequency_ms: 500)),
                Script("patrol"),
            ],
        ),
        (
            components: [
                TextLabel((position: (x: 5.0, y: 5.0), text: "HELLO", asset_id: "charriot-font")),
            ],
        ),
    ],
)
"#;

const MAP: &str = "21,05,10\n00,01,22\n";

fn loader() -> LevelLoader {
    let mut scripts = ScriptLibrary::new();
    scripts.register(
        "patrol",
        |registry: &mut Registry, entity: Entity, _delta_time: f64, _elapsed_ms: u64| {
            set_entity_velocity(registry, entity, 10.0, 0.0).ok();
        },
    );
    LevelLoader::new(scripts)
}

#[test]
fn level_populates_tiles_and_entities() -> Result<()> {
    // --- SETUP ---
    let definition = LevelDefinition::from_ron_str(LEVEL)?;
    let mut registry = Registry::new();

    // --- ACTION ---
    let loaded = loader().load(&mut registry, &definition, Some(MAP))?;
    registry.update();

    // --- ASSERTIONS ---
    assert_eq!(loaded.tiles, 6);
    assert_eq!(loaded.entities.len(), 3);
    assert_eq!(registry.entity_count(), 9);
    assert_eq!(loaded.map_size, Vec2::new(192.0, 128.0));
    assert_eq!(
        loaded.assets["charriot-font"].kind,
        AssetKind::Font { size: 20 }
    );

    let player = registry.get_entity_by_tag(tags::PLAYER).expect("player tagged");
    assert_eq!(player, loaded.entities[0]);
    assert!(registry.has_component::<CameraFollow>(player));
    assert_eq!(registry.component::<Transform>(player).position, Vec2::new(10.0, 20.0));
    assert_eq!(registry.component::<Transform>(player).scale, Vec2::ONE);
    assert_eq!(registry.component::<Sprite>(player).z_index, 4);

    let enemies = registry.get_entities_by_group(tags::ENEMIES);
    assert_eq!(enemies, vec![loaded.entities[1]]);
    let tank = enemies[0];
    assert_eq!(registry.component::<Transform>(tank).rotation, 90.0);
    assert_eq!(registry.component::<Sprite>(tank).src_rect.y, 32.0);
    assert_eq!(registry.component::<Animation>(tank).num_frames, 2);
    assert!(registry.component::<Animation>(tank).is_loop);
    let emitter = registry.component::<ProjectileEmitter>(tank);
    assert_eq!(emitter.repeat_frequency_ms, 500);
    assert_eq!(emitter.hit_percent_damage, 10);
    assert!(registry.has_component::<Script>(tank));

    let label = registry.component::<TextLabel>(loaded.entities[2]);
    assert_eq!(label.text, "HELLO");
    assert!(label.is_fixed);
    Ok(())
}

#[test]
fn tiles_cut_their_source_region_from_the_map_digits() -> Result<()> {
    let definition = LevelDefinition::from_ron_str(LEVEL)?;
    let mut registry = Registry::new();
    loader().load(&mut registry, &definition, Some(MAP))?;
    registry.update();

    let tiles: Vec<Entity> = registry
        .active_entities()
        .filter(|&e| registry.get_component::<Sprite>(e).is_some_and(|s| s.asset_id == "jungle-map"))
        .collect();
    assert_eq!(tiles.len(), 6);

    // Second tile of the first row: cell "05", placed one scaled tile to the right.
    let tile = tiles
        .iter()
        .copied()
        .find(|&e| registry.component::<Transform>(e).position == Vec2::new(64.0, 0.0))
        .expect("tile at (64, 0)");
    let sprite = registry.component::<Sprite>(tile);
    assert_eq!((sprite.src_rect.x, sprite.src_rect.y), (160.0, 0.0));
    assert_eq!(sprite.z_index, 0);
    assert_eq!(registry.component::<Transform>(tile).scale, Vec2::new(2.0, 2.0));
    Ok(())
}

#[test]
fn loading_a_file_reads_the_tilemap_next_to_it() -> Result<()> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("level.ron"), LEVEL)?;
    std::fs::write(dir.path().join("jungle.map"), MAP)?;

    let mut game = Game::default();
    game.scripts_mut().register(
        "patrol",
        |_: &mut Registry, _: Entity, _: f64, _: u64| {},
    );
    let loaded = game.load_level_file(dir.path().join("level.ron"))?;

    assert_eq!(game.map_size(), loaded.map_size);
    assert!(game.registry().is_active(loaded.entities[0]));
    let tracked = game
        .registry()
        .get_system::<sable_sdk::systems::KeyboardControlSystem>()
        .map(|system| system.base().tracked_entities().to_vec());
    assert_eq!(tracked, Some(vec![loaded.entities[0]]));
    Ok(())
}

#[test]
fn missing_level_file_is_reported_with_its_path() {
    let mut game = Game::default();
    let err = game.load_level_file("does/not/exist.ron").unwrap_err();
    assert!(format!("{err:#}").contains("does/not/exist.ron"));
}

#[test]
fn malformed_tilemap_creates_nothing() {
    let definition = LevelDefinition::from_ron_str(LEVEL).unwrap();
    let mut registry = Registry::new();

    let err = loader()
        .load(&mut registry, &definition, Some("21,05,10\n00,x1,22\n"))
        .unwrap_err();

    assert!(matches!(err, LevelError::Tilemap { row: 1, col: 1, .. }));
    assert_eq!(registry.entity_count(), 0);
    assert!(matches!(
        loader().load(&mut registry, &definition, None),
        Err(LevelError::MissingTilemap)
    ));
}

#[test]
fn oversized_tilemap_dimensions_are_a_tilemap_error() {
    let huge = (usize::MAX / 2).to_string();
    let definition =
        LevelDefinition::from_ron_str(&LEVEL.replace("num_rows: 2", &format!("num_rows: {huge}")))
            .unwrap();
    let mut registry = Registry::new();

    let err = loader()
        .load(&mut registry, &definition, Some(MAP))
        .unwrap_err();

    assert!(matches!(err, LevelError::Tilemap { row: 2, col: 0, .. }));
    assert_eq!(registry.entity_count(), 0);

    assert!(matches!(
        sable_sdk::level::parse_tilemap("00\n", usize::MAX / 2, 1),
        Err(LevelError::Tilemap { row: 1, col: 0, .. })
    ));
    assert!(matches!(
        sable_sdk::level::parse_tilemap("00\n", 1, usize::MAX / 2),
        Err(LevelError::Tilemap { row: 0, col: 1, .. })
    ));
}

#[test]
fn unknown_script_is_rejected_before_spawning() {
    let definition = LevelDefinition::from_ron_str(LEVEL).unwrap();
    let mut registry = Registry::new();

    let err = LevelLoader::default()
        .load(&mut registry, &definition, Some(MAP))
        .unwrap_err();

    assert!(matches!(err, LevelError::UnknownScript(ref name) if name == "patrol"));
    assert_eq!(registry.entity_count(), 0);
}

#[test]
fn invalid_ron_is_a_parse_error() {
    assert!(matches!(
        LevelDefinition::from_ron_str("(entities: [ (tag: 3) ])"),
        Err(LevelError::Parse(_))
    ));
}
