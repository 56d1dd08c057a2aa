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

//! The frame driver.

use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use sable_core::event::{EventBus, EventChannel};
use sable_core::math::{Rect, Vec2};
use sable_data::ecs::Registry;

use crate::config::EngineConfig;
use crate::events::{Key, KeyPressedEvent};
use crate::level::{LevelDefinition, LevelError, LevelLoader, LoadedLevel};
use crate::script::ScriptLibrary;
use crate::systems::{
    AnimationSystem, CameraMovementSystem, CollisionSystem, DamageSystem, KeyboardControlSystem,
    MovementSystem, ProjectileEmitSystem, ProjectileLifecycleSystem, ScriptSystem,
};

/// Owns the world and advances it one frame at a time.
///
/// Each [`Game::frame`] call:
/// 1. drains queued input and emits one [`KeyPressedEvent`] per key,
/// 2. resets the event bus and lets the systems subscribe again,
/// 3. runs the systems in a fixed order,
/// 4. commits pending creations and destructions with [`Registry::update`].
pub struct Game {
    registry: Registry,
    event_bus: Rc<EventBus>,
    config: EngineConfig,
    input: EventChannel<Key>,
    loader: LevelLoader,
    camera: Rect,
    map_size: Vec2,
    elapsed_secs: f64,
    elapsed_ms: u64,
    frame_count: u64,
    is_running: bool,
    is_debug: bool,
}

impl Game {
    /// Creates a game with every gameplay system registered.
    pub fn new(config: EngineConfig) -> Self {
        let window = config.window_size();
        let mut game = Self {
            registry: Registry::new(),
            event_bus: Rc::new(EventBus::new()),
            input: EventChannel::new(),
            loader: LevelLoader::default(),
            camera: Rect::new(0.0, 0.0, window.x, window.y),
            map_size: window,
            elapsed_secs: 0.0,
            elapsed_ms: 0,
            frame_count: 0,
            is_running: true,
            is_debug: config.debug,
            config,
        };
        game.setup();
        game
    }

    fn setup(&mut self) {
        let margin = self.config.map_margin;
        let padding = self.config.player_padding_bottom;
        let systems = [
            self.registry.add_system(MovementSystem::new(margin, padding)),
            self.registry.add_system(AnimationSystem::new()),
            self.registry.add_system(CollisionSystem::new()),
            self.registry.add_system(DamageSystem::new()),
            self.registry.add_system(KeyboardControlSystem::new()),
            self.registry.add_system(CameraMovementSystem::new()),
            self.registry.add_system(ProjectileEmitSystem::new()),
            self.registry.add_system(ProjectileLifecycleSystem::new()),
            self.registry.add_system(ScriptSystem::new()),
        ];
        for result in systems {
            if let Err(err) = result {
                log::error!("System registration failed: {err}");
            }
        }
        // Input emitted on the first frame precedes that frame's resubscription.
        self.subscribe_systems();
        log::info!(
            "Game initialized with {} systems.",
            self.registry.system_names().count()
        );
    }

    fn subscribe_systems(&self) {
        let bus = &*self.event_bus;
        if let Some(system) = self.registry.get_system::<MovementSystem>() {
            system.subscribe_to_events(bus);
        }
        if let Some(system) = self.registry.get_system::<DamageSystem>() {
            system.subscribe_to_events(bus);
        }
        if let Some(system) = self.registry.get_system::<KeyboardControlSystem>() {
            system.subscribe_to_events(bus);
        }
        if let Some(system) = self.registry.get_system::<ProjectileEmitSystem>() {
            system.subscribe_to_events(bus);
        }
    }

    /// Populates the registry from `definition` and commits it so the level is live on the
    /// next frame. A level with a tilemap sets the map size.
    pub fn load_level(
        &mut self,
        definition: &LevelDefinition,
        tilemap_text: Option<&str>,
    ) -> Result<LoadedLevel, LevelError> {
        let loaded = self.loader.load(&mut self.registry, definition, tilemap_text)?;
        self.finish_loading(&loaded);
        Ok(loaded)
    }

    /// Reads and loads a level file.
    pub fn load_level_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<LoadedLevel> {
        let path = path.as_ref();
        let loaded = self
            .loader
            .load_file(&mut self.registry, path)
            .with_context(|| format!("Failed to load level {}", path.display()))?;
        self.finish_loading(&loaded);
        Ok(loaded)
    }

    fn finish_loading(&mut self, loaded: &LoadedLevel) {
        if loaded.tiles > 0 {
            self.map_size = loaded.map_size;
        }
        self.registry.update();
    }

    /// Queues a key press for the next frame.
    pub fn press_key(&self, key: Key) {
        self.input.publish(key);
    }

    /// A sender for feeding input from another thread.
    pub fn input_sender(&self) -> flume::Sender<Key> {
        self.input.sender()
    }

    /// Advances the world by `delta_time` seconds, clamped to the configured maximum.
    pub fn frame(&mut self, delta_time: f64) {
        let delta_time = delta_time.max(0.0).min(self.config.max_frame_delta);
        self.elapsed_secs += delta_time;
        self.elapsed_ms = (self.elapsed_secs * 1000.0) as u64;

        self.process_input();

        self.event_bus.reset();
        self.subscribe_systems();

        let bus = Rc::clone(&self.event_bus);
        let elapsed_ms = self.elapsed_ms;
        let map_size = self.map_size;
        let mut camera = self.camera;
        let registry = &mut self.registry;

        registry.run_system(|system: &mut MovementSystem, registry: &mut Registry| {
            system.update(registry, delta_time, map_size)
        });
        registry.run_system(|system: &mut AnimationSystem, registry: &mut Registry| {
            system.update(registry, elapsed_ms)
        });
        registry.run_system(|system: &mut CollisionSystem, registry: &mut Registry| {
            system.update(registry, &bus)
        });
        registry.run_system(|system: &mut DamageSystem, registry: &mut Registry| system.update(registry));
        registry.run_system(|system: &mut KeyboardControlSystem, registry: &mut Registry| {
            system.update(registry)
        });
        registry.run_system(|system: &mut CameraMovementSystem, registry: &mut Registry| {
            system.update(registry, &mut camera, map_size)
        });
        registry.run_system(|system: &mut ProjectileEmitSystem, registry: &mut Registry| {
            system.update(registry, elapsed_ms)
        });
        registry.run_system(|system: &mut ProjectileLifecycleSystem, registry: &mut Registry| {
            system.update(registry, elapsed_ms)
        });
        registry.run_system(|system: &mut ScriptSystem, registry: &mut Registry| {
            system.update(registry, delta_time, elapsed_ms)
        });

        registry.update();
        self.camera = camera;
        self.frame_count += 1;
    }

    /// Runs up to `count` frames of `delta_time` seconds, stopping early once the game
    /// stops. Returns the number of frames run.
    pub fn run_frames(&mut self, count: u64, delta_time: f64) -> u64 {
        let mut ran = 0;
        while ran < count && self.is_running {
            self.frame(delta_time);
            ran += 1;
        }
        ran
    }

    fn process_input(&mut self) {
        for key in self.input.drain() {
            match key {
                Key::Escape => {
                    log::info!("Escape pressed, stopping.");
                    self.is_running = false;
                }
                Key::F1 => {
                    self.is_debug = !self.is_debug;
                    log::debug!("Debug mode {}.", if self.is_debug { "on" } else { "off" });
                }
                _ => {}
            }
            self.event_bus.emit(KeyPressedEvent { key });
        }
    }

    /// Requests the game loop to stop.
    pub fn stop(&mut self) {
        self.is_running = false;
    }

    /// Whether the game loop should keep running.
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Whether debug overlays are enabled.
    pub fn is_debug(&self) -> bool {
        self.is_debug
    }

    /// The world.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The world, mutably.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The event bus shared with the systems.
    pub fn event_bus(&self) -> &Rc<EventBus> {
        &self.event_bus
    }

    /// Scripts levels may reference by name.
    pub fn scripts_mut(&mut self) -> &mut ScriptLibrary {
        self.loader.scripts_mut()
    }

    /// The configuration the game was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The visible region of the map.
    pub fn camera(&self) -> Rect {
        self.camera
    }

    /// Size of the map in world pixels.
    pub fn map_size(&self) -> Vec2 {
        self.map_size
    }

    /// Overrides the map size, e.g. for levels without a tilemap.
    pub fn set_map_size(&mut self, map_size: Vec2) {
        self.map_size = map_size;
    }

    /// Simulation time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Number of frames run.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
