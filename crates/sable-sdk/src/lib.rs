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

//! The public-facing gameplay layer of Sable.
//!
//! This crate assembles the data layer into a runnable simulation: the gameplay
//! [`components`], the [`events`] systems exchange, the gameplay [`systems`], the
//! [`script`] bridge, the declarative [`level`] loader, the engine [`config`] and the
//! [`game::Game`] frame driver.

#![warn(missing_docs)]

pub mod components;
pub mod config;
pub mod events;
pub mod game;
pub mod level;
pub mod script;
pub mod systems;
pub mod tags;

/// Re-exports of the types most games need.
pub mod prelude {
    pub use crate::components::{
        Animation, BoxCollider, CameraFollow, Flip, Health, KeyboardControlled, Projectile,
        ProjectileEmitter, RigidBody, Script, Sprite, TextLabel, Transform,
    };
    pub use crate::config::EngineConfig;
    pub use crate::events::{CollisionEvent, Key, KeyPressedEvent};
    pub use crate::game::Game;
    pub use crate::level::{LevelDefinition, LevelLoader, LoadedLevel};
    pub use crate::script::{ScriptError, ScriptFn};
    pub use sable_core::event::{EventBus, EventChannel};
    pub use sable_core::math::{Rect, Vec2};
    pub use sable_data::ecs::{Component, Entity, Registry, System, SystemBase};
    pub use sable_data::EcsError;
}
