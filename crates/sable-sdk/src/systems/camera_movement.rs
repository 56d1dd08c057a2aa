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

use sable_core::math::{Rect, Vec2};
use sable_data::ecs::{Registry, SystemBase};

use super::impl_system;
use crate::components::{CameraFollow, Transform};

/// Centers the camera on the entity carrying [`CameraFollow`], without leaving the map.
pub struct CameraMovementSystem {
    base: SystemBase,
}

impl_system!(CameraMovementSystem, "CameraMovementSystem");

impl CameraMovementSystem {
    /// Creates the system.
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().require::<CameraFollow>().require::<Transform>(),
        }
    }

    /// Moves `camera` to follow the tracked entities. The last one wins.
    pub fn update(&mut self, registry: &Registry, camera: &mut Rect, map_size: Vec2) {
        for &entity in self.base.tracked_entities() {
            let position = registry.component::<Transform>(entity).position;

            if position.x + camera.w / 2.0 < map_size.x {
                camera.x = position.x - camera.w / 2.0;
            }
            if position.y + camera.h / 2.0 < map_size.y {
                camera.y = position.y - camera.h / 2.0;
            }

            camera.x = camera.x.min(map_size.x - camera.w).max(0.0);
            camera.y = camera.y.min(map_size.y - camera.h).max(0.0);
        }
    }
}

impl Default for CameraMovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_centers_on_target_and_stays_inside_map() {
        let mut registry = Registry::new();
        registry.add_system(CameraMovementSystem::new()).unwrap();
        let target = registry.create_entity();
        registry.add_component(target, CameraFollow).unwrap();
        registry.add_component(target, Transform::at(Vec2::new(1000.0, 50.0))).unwrap();
        registry.update();

        let mut camera = Rect::new(0.0, 0.0, 800.0, 600.0);
        let map = Vec2::new(1600.0, 1280.0);
        registry.run_system::<CameraMovementSystem, _>(|s, r| s.update(r, &mut camera, map));
        assert_eq!(camera.x, 600.0);
        assert_eq!(camera.y, 0.0, "Clamped at the top edge");

        registry.component_mut::<Transform>(target).position = Vec2::new(1590.0, 900.0);
        registry.run_system::<CameraMovementSystem, _>(|s, r| s.update(r, &mut camera, map));
        assert_eq!(camera.x, 600.0, "Not moved once the view would overrun the map");
        assert_eq!(camera.y, 600.0);
    }
}
