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

//! Axis-aligned box collision detection.

use sable_core::event::EventBus;
use sable_core::math::Rect;
use sable_data::ecs::{Entity, Registry, SystemBase};

use super::impl_system;
use crate::components::{BoxCollider, Transform};
use crate::events::CollisionEvent;

/// Emits one [`CollisionEvent`] per overlapping pair of tracked entities each update.
///
/// Entities already marked for destruction are ignored.
pub struct CollisionSystem {
    base: SystemBase,
}

impl_system!(CollisionSystem, "CollisionSystem");

impl CollisionSystem {
    /// Creates the system.
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().require::<Transform>().require::<BoxCollider>(),
        }
    }

    /// Tests every unordered pair once and returns the number of collisions emitted.
    pub fn update(&mut self, registry: &Registry, bus: &EventBus) -> usize {
        let colliders: Vec<(Entity, Rect)> = self
            .base
            .tracked_entities()
            .iter()
            .filter(|e| !registry.is_pending_kill(**e))
            .map(|&e| {
                let transform = registry.component::<Transform>(e);
                (e, registry.component::<BoxCollider>(e).bounds(transform))
            })
            .collect();

        let mut collisions = 0;
        for (i, (a, a_bounds)) in colliders.iter().enumerate() {
            for (b, b_bounds) in &colliders[i + 1..] {
                if a_bounds.intersects(b_bounds) {
                    bus.emit(CollisionEvent { a: *a, b: *b });
                    collisions += 1;
                }
            }
        }
        collisions
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}
