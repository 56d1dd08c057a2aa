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

//! Events exchanged between gameplay systems through the event bus.

use sable_data::ecs::Entity;

/// Two entities whose colliders overlap this frame. Emitted once per unordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// The entity tracked first by the collision system.
    pub a: Entity,
    /// The other entity.
    pub b: Entity,
}

impl CollisionEvent {
    /// Returns `true` if `entity` takes part in the collision.
    pub fn involves(&self, entity: Entity) -> bool {
        self.a == entity || self.b == entity
    }
}

/// A key as reported by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    Up,
    /// Right arrow.
    Right,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// F1.
    F1,
    /// Any other key, by platform key code.
    Other(u32),
}

impl Key {
    /// The sprite sheet row for arrow keys (up, right, down, left), `None` otherwise.
    pub fn direction_row(self) -> Option<u32> {
        match self {
            Key::Up => Some(0),
            Key::Right => Some(1),
            Key::Down => Some(2),
            Key::Left => Some(3),
            _ => None,
        }
    }
}

/// A key press, emitted once per press by the frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPressedEvent {
    /// The pressed key.
    pub key: Key,
}
