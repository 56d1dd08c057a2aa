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
use sable_data::ecs::{Registry, SystemBase};

use super::impl_system;
use crate::components::{KeyboardControlled, RigidBody, Sprite};
use crate::events::{Key, KeyPressedEvent};

/// Steers keyboard-controlled entities with the arrow keys.
///
/// Each arrow sets the velocity configured in [`KeyboardControlled`] and selects the
/// matching row of the sprite sheet (up, right, down, left).
pub struct KeyboardControlSystem {
    base: SystemBase,
    key_presses: EventChannel<KeyPressedEvent>,
}

impl_system!(KeyboardControlSystem, "KeyboardControlSystem");

impl KeyboardControlSystem {
    /// Creates the system.
    pub fn new() -> Self {
        Self {
            base: SystemBase::new()
                .require::<KeyboardControlled>()
                .require::<RigidBody>()
                .require::<Sprite>(),
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

    /// Applies every key press received since the last update, in order.
    pub fn update(&mut self, registry: &mut Registry) {
        for KeyPressedEvent { key } in self.key_presses.drain() {
            let Some(row) = key.direction_row() else {
                continue;
            };
            for &entity in self.base.tracked_entities() {
                let control = *registry.component::<KeyboardControlled>(entity);
                registry.component_mut::<RigidBody>(entity).velocity = match key {
                    Key::Up => control.up_velocity,
                    Key::Right => control.right_velocity,
                    Key::Down => control.down_velocity,
                    _ => control.left_velocity,
                };
                let sprite = registry.component_mut::<Sprite>(entity);
                sprite.src_rect.y = (sprite.height * row) as f32;
            }
        }
    }
}

impl Default for KeyboardControlSystem {
    fn default() -> Self {
        Self::new()
    }
}
