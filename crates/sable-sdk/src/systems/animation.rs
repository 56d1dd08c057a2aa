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
use crate::components::{Animation, Sprite};

/// Advances sprite-sheet animations along the horizontal strip.
pub struct AnimationSystem {
    base: SystemBase,
}

impl_system!(AnimationSystem, "AnimationSystem");

impl AnimationSystem {
    /// Creates the system.
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().require::<Sprite>().require::<Animation>(),
        }
    }

    /// Selects the frame due at `elapsed_ms` and moves the sprite's source rectangle to it.
    ///
    /// Non-looping animations stop on their last frame.
    pub fn update(&mut self, registry: &mut Registry, elapsed_ms: u64) {
        for &entity in self.base.tracked_entities() {
            let animation = registry.component_mut::<Animation>(entity);
            let num_frames = u64::from(animation.num_frames.max(1));
            let frames_played = elapsed_ms.saturating_sub(animation.start_time_ms)
                * u64::from(animation.frame_speed_rate)
                / 1000;
            let frame = if animation.is_loop {
                frames_played % num_frames
            } else {
                frames_played.min(num_frames - 1)
            };
            animation.current_frame = frame as u32;

            let sprite = registry.component_mut::<Sprite>(entity);
            sprite.src_rect.x = frame as f32 * sprite.width as f32;
        }
    }
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}
