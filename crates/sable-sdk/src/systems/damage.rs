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
use sable_data::ecs::{Entity, Registry, SystemBase};

use super::impl_system;
use crate::components::{BoxCollider, Health, Projectile};
use crate::events::CollisionEvent;
use crate::tags;

/// Applies projectile damage.
///
/// Hostile projectiles hurt the player, friendly projectiles hurt enemies. A projectile
/// that deals damage is destroyed; its target is destroyed once its health drops to zero.
pub struct DamageSystem {
    base: SystemBase,
    collisions: EventChannel<CollisionEvent>,
}

impl_system!(DamageSystem, "DamageSystem");

impl DamageSystem {
    /// Creates the system.
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().require::<BoxCollider>(),
            collisions: EventChannel::new(),
        }
    }

    /// Forwards collision events into this system.
    pub fn subscribe_to_events(&self, bus: &EventBus) {
        let sender = self.collisions.sender();
        bus.subscribe_fn(move |event: &mut CollisionEvent| {
            sender.send(*event).ok();
        });
    }

    /// Resolves every collision received since the last update.
    pub fn update(&mut self, registry: &mut Registry) {
        for CollisionEvent { a, b } in self.collisions.drain() {
            if !registry.is_active(a) || !registry.is_active(b) {
                continue;
            }

            let is_projectile = |e| registry.entity_belongs_to_group(e, tags::PROJECTILES);
            let is_player = |e| registry.entity_has_tag(e, tags::PLAYER);
            let is_enemy = |e| registry.entity_belongs_to_group(e, tags::ENEMIES);

            let hit = if is_projectile(a) && is_player(b) {
                Some((a, b, false))
            } else if is_projectile(b) && is_player(a) {
                Some((b, a, false))
            } else if is_projectile(a) && is_enemy(b) {
                Some((a, b, true))
            } else if is_projectile(b) && is_enemy(a) {
                Some((b, a, true))
            } else {
                None
            };

            if let Some((projectile, target, hurts_when_friendly)) = hit {
                apply_hit(registry, projectile, target, hurts_when_friendly);
            }
        }
    }
}

impl Default for DamageSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_hit(registry: &mut Registry, projectile: Entity, target: Entity, hurts_when_friendly: bool) {
    let Some(&stats) = registry.get_component::<Projectile>(projectile) else {
        log::warn!("Entity {projectile} is grouped as a projectile but has no Projectile component");
        return;
    };
    if stats.is_friendly != hurts_when_friendly {
        return;
    }

    match registry.get_component_mut::<Health>(target) {
        Some(health) => {
            health.health_percentage -= stats.hit_percent_damage;
            let remaining = health.health_percentage;
            log::debug!("Entity {target} hit by {projectile}, health now {remaining}%");
            if remaining <= 0 {
                registry.kill_entity(target);
            }
        }
        None => log::debug!("Entity {target} hit by {projectile} but has no health"),
    }
    registry.kill_entity(projectile);
}
