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

// Sable Sandbox
// Runs the demo level headless for a fixed number of frames and logs what happened.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sable_core::Stopwatch;
use sable_sdk::prelude::*;
use sable_sdk::script::{get_entity_position, set_entity_velocity, ScriptLibrary};
use sable_sdk::tags;

const FRAMES: u64 = 600;
const DELTA_TIME: f64 = 1.0 / 60.0;

/// Key presses replayed by the sandbox, by frame number.
const INPUT_SCRIPT: &[(u64, Key)] = &[
    (30, Key::Right),
    (60, Key::Space),
    (90, Key::Down),
    (120, Key::Space),
    (180, Key::F1),
    (240, Key::Left),
    (300, Key::Space),
    (360, Key::Up),
    (420, Key::Space),
];

fn register_scripts(scripts: &mut ScriptLibrary) {
    // Drives back and forth along the x axis, turning every two seconds.
    scripts.register(
        "patrol",
        |registry: &mut Registry, entity: Entity, _delta_time: f64, elapsed_ms: u64| {
            let heading = if (elapsed_ms / 2000) % 2 == 0 { 1.0 } else { -1.0 };
            if set_entity_velocity(registry, entity, 40.0 * heading, 0.0).is_ok() {
                if let Ok(position) = get_entity_position(registry, entity) {
                    log::trace!("Patrol {entity} at {position:?}");
                }
            }
        },
    );
}

fn summarize(game: &Game, wall_secs: f64) {
    let registry = game.registry();
    let enemies = registry.get_entities_by_group(tags::ENEMIES);
    let projectiles = registry.get_entities_by_group(tags::PROJECTILES);

    log::info!(
        "Ran {} frames ({} ms simulated) in {:.3} s.",
        game.frame_count(),
        game.elapsed_ms(),
        wall_secs
    );
    log::info!(
        "{} entities alive: {} enemies, {} projectiles in flight.",
        registry.entity_count(),
        enemies.len(),
        projectiles.len()
    );
    match registry.get_entity_by_tag(tags::PLAYER) {
        Some(player) => {
            let position = registry.component::<Transform>(player).position;
            let health = registry
                .get_component::<Health>(player)
                .map_or(0, |h| h.health_percentage);
            log::info!("Player at ({:.1}, {:.1}) with {health}% health.", position.x, position.y);
        }
        None => log::info!("The player did not survive."),
    }
    let camera = game.camera();
    log::info!("Camera at ({:.1}, {:.1}).", camera.x, camera.y);
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/config.ron"));
    let config = EngineConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let mut game = Game::new(config.clone());
    register_scripts(game.scripts_mut());
    if let Some(level) = &config.level {
        game.load_level_file(base_dir.join(level))?;
    }

    let input = game.input_sender();
    let stopwatch = Stopwatch::new();
    for frame in 0..FRAMES {
        for &(_, key) in INPUT_SCRIPT.iter().filter(|(at, _)| *at == frame) {
            input
                .send(key)
                .map_err(|_| anyhow::anyhow!("Input channel closed"))?;
        }
        game.frame(DELTA_TIME);
        if !game.is_running() {
            break;
        }
    }

    summarize(&game, stopwatch.elapsed_secs_f64());
    Ok(())
}
