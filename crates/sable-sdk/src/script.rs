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

//! The bridge scripts use to read and write components.
//!
//! Scripts are plain Rust closures attached through the [`Script`](crate::components::Script)
//! component and looked up by name from a [`ScriptLibrary`] when a level is loaded. The
//! bridge functions below are the only component accessors scripts are expected to use:
//! each one checks that the component exists and reports a [`ScriptError`] instead of
//! panicking when it does not.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sable_core::math::Vec2;
use sable_data::ecs::{Component, Entity, Registry};
use thiserror::Error;

use crate::components::{Animation, ProjectileEmitter, RigidBody, Transform};

/// A per-frame script: `(registry, entity, delta_time_secs, elapsed_ms)`.
pub type ScriptFn = Arc<dyn Fn(&mut Registry, Entity, f64, u64) + Send + Sync>;

/// Errors reported by the script bridge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The entity lacks the component the operation needs. Nothing was modified.
    #[error("{operation}: entity {entity} has no {component} component")]
    MissingComponent {
        /// The entity the script addressed.
        entity: Entity,
        /// The missing component.
        component: &'static str,
        /// The bridge function that failed.
        operation: &'static str,
    },
}

fn missing(entity: Entity, component: &'static str, operation: &'static str) -> ScriptError {
    let error = ScriptError::MissingComponent {
        entity,
        component,
        operation,
    };
    log::error!("{error}");
    error
}

fn read<T: Component, R>(
    registry: &Registry,
    entity: Entity,
    component: &'static str,
    operation: &'static str,
    f: impl FnOnce(&T) -> R,
) -> Result<R, ScriptError> {
    registry
        .get_component::<T>(entity)
        .map(f)
        .ok_or_else(|| missing(entity, component, operation))
}

fn write<T: Component>(
    registry: &mut Registry,
    entity: Entity,
    component: &'static str,
    operation: &'static str,
    f: impl FnOnce(&mut T),
) -> Result<(), ScriptError> {
    registry
        .get_component_mut::<T>(entity)
        .map(f)
        .ok_or_else(|| missing(entity, component, operation))
}

/// Returns the position of `entity`.
pub fn get_entity_position(registry: &Registry, entity: Entity) -> Result<Vec2, ScriptError> {
    read(registry, entity, "Transform", "get_entity_position", |t: &Transform| t.position)
}

/// Returns the velocity of `entity`.
pub fn get_entity_velocity(registry: &Registry, entity: Entity) -> Result<Vec2, ScriptError> {
    read(registry, entity, "RigidBody", "get_entity_velocity", |rb: &RigidBody| rb.velocity)
}

/// Moves `entity` to `(x, y)`.
pub fn set_entity_position(
    registry: &mut Registry,
    entity: Entity,
    x: f32,
    y: f32,
) -> Result<(), ScriptError> {
    write(registry, entity, "Transform", "set_entity_position", |t: &mut Transform| {
        t.position = Vec2::new(x, y);
    })
}

/// Sets the velocity of `entity`.
pub fn set_entity_velocity(
    registry: &mut Registry,
    entity: Entity,
    x: f32,
    y: f32,
) -> Result<(), ScriptError> {
    write(registry, entity, "RigidBody", "set_entity_velocity", |rb: &mut RigidBody| {
        rb.velocity = Vec2::new(x, y);
    })
}

/// Sets the rotation of `entity`, in degrees.
pub fn set_entity_rotation(
    registry: &mut Registry,
    entity: Entity,
    rotation: f32,
) -> Result<(), ScriptError> {
    write(registry, entity, "Transform", "set_entity_rotation", |t: &mut Transform| {
        t.rotation = rotation;
    })
}

/// Forces the displayed animation frame of `entity`.
pub fn set_entity_animation_frame(
    registry: &mut Registry,
    entity: Entity,
    frame: u32,
) -> Result<(), ScriptError> {
    write(
        registry,
        entity,
        "Animation",
        "set_entity_animation_frame",
        |a: &mut Animation| a.current_frame = frame,
    )
}

/// Sets the velocity given to projectiles emitted by `entity`.
pub fn set_projectile_velocity(
    registry: &mut Registry,
    entity: Entity,
    x: f32,
    y: f32,
) -> Result<(), ScriptError> {
    write(
        registry,
        entity,
        "ProjectileEmitter",
        "set_projectile_velocity",
        |e: &mut ProjectileEmitter| e.projectile_velocity = Vec2::new(x, y),
    )
}

/// Named scripts that level files can reference.
#[derive(Clone, Default)]
pub struct ScriptLibrary {
    scripts: HashMap<String, ScriptFn>,
}

impl ScriptLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `script` under `name`, replacing any script with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, script: F)
    where
        F: Fn(&mut Registry, Entity, f64, u64) + Send + Sync + 'static,
    {
        let name = name.into();
        log::debug!("Script `{name}` registered");
        self.scripts.insert(name, Arc::new(script));
    }

    /// Returns the script registered under `name`.
    pub fn get(&self, name: &str) -> Option<ScriptFn> {
        self.scripts.get(name).cloned()
    }

    /// Number of registered scripts.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Returns `true` if no script is registered.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl fmt::Debug for ScriptLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.scripts.keys().collect();
        names.sort();
        f.debug_struct("ScriptLibrary").field("scripts", &names).finish()
    }
}
