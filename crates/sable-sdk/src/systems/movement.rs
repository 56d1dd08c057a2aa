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

use sable_core::event::{EventBus, EventChannel};
use sable_core::math::Vec2;
use sable_data::ecs::{Entity, Registry, SystemBase};

use super::impl_system;
use crate::components::{Flip, RigidBody, Sprite, Transform};
use crate::events::CollisionEvent;
use crate::tags;

/// Integrates velocities, culls entities that leave the map and keeps the player inside it.
///
/// Enemies colliding with obstacles reverse direction. Collisions are received through the
/// bus and applied at the start of the next update.
pub struct MovementSystem {
    base: SystemBase,
    collisions: EventChannel<CollisionEvent>,
    map_margin: f32,
    player_padding_bottom: f32,
}

impl_system!(MovementSystem, "MovementSystem");

impl MovementSystem {
    /// Creates the system. Entities further than `map_margin` outside the map are killed;
    /// the player keeps `player_padding_bottom` pixels clear of the bottom edge.
    pub fn new(map_margin: f32, player_padding_bottom: f32) -> Self {
        Self {
            base: SystemBase::new().require::<Transform>().require::<RigidBody>(),
            collisions: EventChannel::new(),
            map_margin,
            player_padding_bottom,
        }
    }

    /// Forwards collision events into this system for the next update.
    pub fn subscribe_to_events(&self, bus: &EventBus) {
        let sender = self.collisions.sender();
        bus.subscribe_fn(move |event: &mut CollisionEvent| {
            sender.send(*event).ok();
        });
    }

    /// Advances every tracked entity by `delta_time` seconds.
    pub fn update(&mut self, registry: &mut Registry, delta_time: f64, map_size: Vec2) {
        for event in self.collisions.drain() {
            on_collision(registry, event);
        }

        let margin = self.map_margin;
        for &entity in self.base.tracked_entities() {
            let velocity = registry.component::<RigidBody>(entity).velocity;
            let transform = registry.component_mut::<Transform>(entity);
            transform.position += velocity * delta_time as f32;
            let position = transform.position;

            let is_player = registry.entity_has_tag(entity, tags::PLAYER);
            let outside_map = position.x < -margin
                || position.x > map_size.x + margin
                || position.y < -margin
                || position.y > map_size.y + margin;

            if outside_map && !is_player {
                registry.kill_entity(entity);
                continue;
            }

            if is_player {
                self.keep_inside_map(registry, entity, map_size);
            }
        }
    }

    fn keep_inside_map(&self, registry: &mut Registry, player: Entity, map_size: Vec2) {
        let Some(sprite) = registry.get_component::<Sprite>(player) else {
            return;
        };
        let max_x = map_size.x - sprite.width as f32;
        let max_y = map_size.y - sprite.height as f32 - self.player_padding_bottom;

        let position = &mut registry.component_mut::<Transform>(player).position;
        if position.x < 0.0 {
            position.x = 0.0;
        }
        if position.x > max_x {
            position.x = max_x;
        }
        if position.y < 0.0 {
            position.y = 0.0;
        }
        if position.y > max_y {
            position.y = max_y;
        }
    }
}

fn on_collision(registry: &mut Registry, event: CollisionEvent) {
    let CollisionEvent { a, b } = event;
    let a_enemy = registry.entity_belongs_to_group(a, tags::ENEMIES);
    let b_enemy = registry.entity_belongs_to_group(b, tags::ENEMIES);
    let a_obstacle = registry.entity_belongs_to_group(a, tags::OBSTACLES);
    let b_obstacle = registry.entity_belongs_to_group(b, tags::OBSTACLES);

    if a_enemy && b_obstacle {
        bounce(registry, a);
    }
    if a_obstacle && b_enemy {
        bounce(registry, b);
    }
}

fn bounce(registry: &mut Registry, enemy: Entity) {
    if !registry.has_component::<Sprite>(enemy) {
        return;
    }
    let Some(velocity) = registry.get_component_mut::<RigidBody>(enemy).map(|rb| {
        if rb.velocity.x != 0.0 {
            rb.velocity.x = -rb.velocity.x;
        }
        if rb.velocity.y != 0.0 {
            rb.velocity.y = -rb.velocity.y;
        }
        rb.velocity
    }) else {
        return;
    };

    let sprite = registry.component_mut::<Sprite>(enemy);
    if velocity.x != 0.0 {
        sprite.flip = sprite.flip.toggled(Flip::Horizontal);
    }
    if velocity.y != 0.0 {
        sprite.flip = sprite.flip.toggled(Flip::Vertical);
    }
    log::trace!("Enemy {enemy} bounced off an obstacle");
}
