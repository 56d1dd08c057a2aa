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

use sable_data::ecs::{Registry, SystemBase};

use super::impl_system;
use crate::components::Projectile;

/// Destroys projectiles that outlived their duration.
pub struct ProjectileLifecycleSystem {
    base: SystemBase,
}

impl_system!(ProjectileLifecycleSystem, "ProjectileLifecycleSystem");

impl ProjectileLifecycleSystem {
    /// Creates the system.
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().require::<Projectile>(),
        }
    }

    /// Kills every projectile older than its duration at `elapsed_ms`.
    pub fn update(&mut self, registry: &mut Registry, elapsed_ms: u64) {
        for &entity in self.base.tracked_entities() {
            let projectile = registry.component::<Projectile>(entity);
            if elapsed_ms.saturating_sub(projectile.start_time_ms) > projectile.duration_ms {
                registry.kill_entity(entity);
            }
        }
    }
}

impl Default for ProjectileLifecycleSystem {
    fn default() -> Self {
        Self::new()
    }
}
