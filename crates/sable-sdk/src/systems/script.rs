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
use crate::components::Script;

/// Runs the per-frame closure of every entity carrying a [`Script`].
pub struct ScriptSystem {
    base: SystemBase,
}

impl_system!(ScriptSystem, "ScriptSystem");

impl ScriptSystem {
    /// Creates the system.
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().require::<Script>(),
        }
    }

    /// Invokes each script with `(registry, entity, delta_time, elapsed_ms)`.
    pub fn update(&mut self, registry: &mut Registry, delta_time: f64, elapsed_ms: u64) {
        for &entity in self.base.tracked_entities() {
            // An earlier script may have detached this one.
            let Some(script) = registry.get_component::<Script>(entity) else {
                continue;
            };
            let on_update = script.on_update.clone();
            on_update(registry, entity, delta_time, elapsed_ms);
        }
    }
}

impl Default for ScriptSystem {
    fn default() -> Self {
        Self::new()
    }
}
