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

//! Gameplay systems.
//!
//! Each system embeds a [`SystemBase`](sable_data::ecs::SystemBase) declaring the components
//! it requires and exposes an inherent `update` taking the registry plus whatever
//! per-frame inputs it needs. The [`Game`](crate::game::Game) driver runs them through
//! [`Registry::run_system`](sable_data::ecs::Registry::run_system) in a fixed order.
//!
//! Systems that react to bus events subscribe once per frame after the bus reset.
//! Their callbacks only forward the event into the system's own
//! [`EventChannel`](sable_core::event::EventChannel); the system applies it during its
//! next update, when it has access to the registry.

mod animation;
mod camera_movement;
mod collision;
mod damage;
mod keyboard_control;
mod movement;
mod projectile_emit;
mod projectile_lifecycle;
mod script;

pub use animation::AnimationSystem;
pub use camera_movement::CameraMovementSystem;
pub use collision::CollisionSystem;
pub use damage::DamageSystem;
pub use keyboard_control::KeyboardControlSystem;
pub use movement::MovementSystem;
pub use projectile_emit::ProjectileEmitSystem;
pub use projectile_lifecycle::ProjectileLifecycleSystem;
pub use script::ScriptSystem;

/// Implements [`System`](sable_data::ecs::System) for a struct with a `base: SystemBase` field.
macro_rules! impl_system {
    ($ty:ty, $name:literal) => {
        impl sable_data::ecs::System for $ty {
            fn base(&self) -> &sable_data::ecs::SystemBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut sable_data::ecs::SystemBase {
                &mut self.base
            }

            fn name(&self) -> &'static str {
                $name
            }
        }
    };
}

pub(crate) use impl_system;
