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

//! Projectile emission, periodic and on demand.

use sable_core::event::{EventBus, EventChannel};
use sable_core::math::Vec2;
use sable_data::ecs::{Entity, Registry, SystemBase};
use sable_data::EcsError;

use super::impl_system;
use crate::components::{BoxCollider, Projectile, ProjectileEmitter, RigidBody, Sprite, Transform};
use crate::events::{Key, KeyPressedEvent};
use crate::tags;

/// Texture used for every projectile.
pub const PROJECTILE_ASSET_ID: &str = "bullet-texture";
const PROJECTILE_SIZE: u32 = 4;

/// Spawns projectiles from every [`ProjectileEmitter`].
///
/// Emitters with a non-zero repeat frequency fire automatically. The player additionally
/// fires on every press of [`Key::Space`], in the direction it is moving.
pub struct ProjectileEmitSystem {
    base: SystemBase,
    key_presses: EventChannel<KeyPressedEvent>,
}

impl_system!(ProjectileEmitSystem, "ProjectileEmitSystem");

impl ProjectileEmitSystem {
    /// Creates the system.
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().require::<ProjectileEmitter>().require::<Transform>(),
            key_presses: EventChannel::new(),
        }
    }

    /// Forwards key presses into this system.
    pub fn subscribe_to_events(&self, bus: &EventBus) {
        let sender = self.key_presses.sender();
        bus.subscribe_fn(move |event: &mut KeyPressedEvent| {
            sender.send(*event).ok();
        });
    }

    /// Emits due projectiles. `elapsed_ms` is the simulation clock.
    pub fn update(&mut self, registry: &mut Registry, elapsed_ms: u64) {
        let shots = self
            .key_presses
            .drain()
            .into_iter()
            .filter(|event| event.key == Key::Space)
            .count();

        for &entity in self.base.tracked_entities() {
            if shots > 0 && registry.entity_has_tag(entity, tags::PLAYER) {
                for _ in 0..shots {
                    if let Err(err) = fire_from_player(registry, entity, elapsed_ms) {
                        log::error!("Player projectile emission failed: {err}");
                    }
                }
            }

            let emitter = *registry.component::<ProjectileEmitter>(entity);
            if emitter.repeat_frequency_ms == 0 {
                continue;
            }
            if elapsed_ms.saturating_sub(emitter.last_emission_time_ms) > emitter.repeat_frequency_ms {
                let origin = muzzle_position(registry, entity);
                match spawn_projectile(registry, origin, emitter.projectile_velocity, &emitter, elapsed_ms) {
                    Ok(_) => {
                        registry
                            .component_mut::<ProjectileEmitter>(entity)
                            .last_emission_time_ms = elapsed_ms;
                    }
                    Err(err) => log::error!("Projectile emission from {entity} failed: {err}"),
                }
            }
        }
    }
}

impl Default for ProjectileEmitSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// The center of the emitter's sprite, or its position when it has none.
fn muzzle_position(registry: &Registry, emitter: Entity) -> Vec2 {
    let transform = registry.component::<Transform>(emitter);
    match registry.get_component::<Sprite>(emitter) {
        Some(sprite) => {
            let half = Vec2::new(sprite.width as f32, sprite.height as f32) * 0.5;
            transform.position + transform.scale * half
        }
        None => transform.position,
    }
}

fn fire_from_player(registry: &mut Registry, player: Entity, elapsed_ms: u64) -> Result<Entity, EcsError> {
    let emitter = *registry.component::<ProjectileEmitter>(player);
    let heading = registry
        .get_component::<RigidBody>(player)
        .map(|rb| rb.velocity.direction_sign())
        .unwrap_or(Vec2::ZERO);
    let origin = muzzle_position(registry, player);
    spawn_projectile(registry, origin, emitter.projectile_velocity * heading, &emitter, elapsed_ms)
}

/// Creates a projectile entity in the projectiles group.
pub fn spawn_projectile(
    registry: &mut Registry,
    position: Vec2,
    velocity: Vec2,
    emitter: &ProjectileEmitter,
    elapsed_ms: u64,
) -> Result<Entity, EcsError> {
    let id = registry
        .spawn()
        .group(tags::PROJECTILES)?
        .add_component(Transform::at(position))?
        .add_component(RigidBody { velocity })?
        .add_component(Sprite::new(PROJECTILE_ASSET_ID, PROJECTILE_SIZE, PROJECTILE_SIZE, 4))?
        .add_component(BoxCollider::new(PROJECTILE_SIZE as f32, PROJECTILE_SIZE as f32))?
        .add_component(Projectile {
            is_friendly: emitter.is_friendly,
            hit_percent_damage: emitter.hit_percent_damage,
            duration_ms: emitter.projectile_duration_ms,
            start_time_ms: elapsed_ms,
        })?
        .id();
    log::trace!("Projectile {id} emitted at {position:?}");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turret(registry: &mut Registry, repeat_frequency_ms: u64) -> Entity {
        let id = registry.create_entity();
        registry.add_component(id, Transform::at(Vec2::new(10.0, 10.0))).unwrap();
        registry.add_component(id, Sprite::new("tank", 32, 32, 1)).unwrap();
        registry
            .add_component(
                id,
                ProjectileEmitter {
                    projectile_velocity: Vec2::new(100.0, 0.0),
                    repeat_frequency_ms,
                    ..ProjectileEmitter::default()
                },
            )
            .unwrap();
        id
    }

    #[test]
    fn emits_when_the_period_has_elapsed() {
        let mut registry = Registry::new();
        registry.add_system(ProjectileEmitSystem::new()).unwrap();
        let emitter = turret(&mut registry, 500);
        registry.update();

        registry.run_system::<ProjectileEmitSystem, _>(|s, r| s.update(r, 400));
        assert!(registry.get_entities_by_group(tags::PROJECTILES).is_empty());

        registry.run_system::<ProjectileEmitSystem, _>(|s, r| s.update(r, 501));
        let projectiles = registry.get_entities_by_group(tags::PROJECTILES);
        assert_eq!(projectiles.len(), 1);
        let projectile = projectiles[0];
        assert!(registry.is_pending_create(projectile));
        assert_eq!(registry.component::<Transform>(projectile).position, Vec2::new(26.0, 26.0));
        assert_eq!(registry.component::<Projectile>(projectile).start_time_ms, 501);
        assert_eq!(registry.component::<ProjectileEmitter>(emitter).last_emission_time_ms, 501);
    }

    #[test]
    fn player_fires_on_space_in_its_heading() {
        let mut registry = Registry::new();
        let bus = EventBus::new();
        registry.add_system(ProjectileEmitSystem::new()).unwrap();
        let player = turret(&mut registry, 0);
        registry.tag_entity(player, tags::PLAYER).unwrap();
        registry.add_component(player, RigidBody { velocity: Vec2::new(-5.0, 0.0) }).unwrap();
        registry.update();

        if let Some(system) = registry.get_system::<ProjectileEmitSystem>() {
            system.subscribe_to_events(&bus);
        }
        bus.emit(KeyPressedEvent { key: Key::Space });
        bus.emit(KeyPressedEvent { key: Key::Up });
        registry.run_system::<ProjectileEmitSystem, _>(|s, r| s.update(r, 10_000));

        let projectiles = registry.get_entities_by_group(tags::PROJECTILES);
        assert_eq!(projectiles.len(), 1, "Periodic emission is disabled at zero frequency");
        assert_eq!(
            registry.component::<RigidBody>(projectiles[0]).velocity,
            Vec2::new(-100.0, 0.0)
        );
    }
}
