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

//! Entity handles: borrowed views of one entity inside a [`Registry`].

use std::fmt;

use sable_core::ecs::entity::EntityId;

use super::component::Component;
use super::error::EcsError;
use super::registry::Registry;

/// The identifier callers pass around. Copyable and comparable; equality requires
/// both the index and the generation to match.
pub type Entity = EntityId;

/// A read-only handle binding an [`Entity`] to the registry that owns it.
///
/// Obtained from [`Registry::entity`]. Every operation forwards to the registry.
#[derive(Clone, Copy)]
pub struct EntityRef<'r> {
    id: Entity,
    registry: &'r Registry,
}

impl<'r> EntityRef<'r> {
    pub(crate) fn new(id: Entity, registry: &'r Registry) -> Self {
        Self { id, registry }
    }

    /// The entity identifier.
    pub fn id(&self) -> Entity {
        self.id
    }

    /// Returns `true` while the entity is addressable (not yet committed as destroyed).
    pub fn is_alive(&self) -> bool {
        self.registry.is_alive(self.id)
    }

    /// Returns `true` if the entity carries a `T`.
    pub fn has_component<T: Component>(&self) -> bool {
        self.registry.has_component::<T>(self.id)
    }

    /// Returns the entity's `T`, if present.
    pub fn get_component<T: Component>(&self) -> Option<&'r T> {
        self.registry.get_component::<T>(self.id)
    }

    /// Returns the entity's `T`.
    ///
    /// # Panics
    ///
    /// Panics if the entity does not carry a `T`.
    pub fn component<T: Component>(&self) -> &'r T {
        self.registry.component::<T>(self.id)
    }

    /// Returns `true` if the entity holds the tag `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.registry.entity_has_tag(self.id, tag)
    }

    /// Returns `true` if the entity belongs to the group `group`.
    pub fn belongs_to_group(&self, group: &str) -> bool {
        self.registry.entity_belongs_to_group(self.id, group)
    }
}

/// A mutable handle binding an [`Entity`] to the registry that owns it.
///
/// Obtained from [`Registry::entity_mut`] or [`Registry::spawn`]. Mutators return
/// `&mut Self` so attachments can be chained:
///
/// ```
/// # use sable_data::ecs::{Component, Registry};
/// # struct Position(f32, f32);
/// # impl Component for Position {}
/// # struct Velocity(f32, f32);
/// # impl Component for Velocity {}
/// # fn main() -> Result<(), sable_data::EcsError> {
/// let mut registry = Registry::new();
/// let id = registry
///     .spawn()
///     .add_component(Position(0.0, 0.0))?
///     .add_component(Velocity(1.0, 0.0))?
///     .id();
/// assert!(registry.has_component::<Velocity>(id));
/// # Ok(())
/// # }
/// ```
pub struct EntityMut<'r> {
    id: Entity,
    registry: &'r mut Registry,
}

impl<'r> EntityMut<'r> {
    pub(crate) fn new(id: Entity, registry: &'r mut Registry) -> Self {
        Self { id, registry }
    }

    /// The entity identifier.
    pub fn id(&self) -> Entity {
        self.id
    }

    /// Returns `true` while the entity is addressable (not yet committed as destroyed).
    pub fn is_alive(&self) -> bool {
        self.registry.is_alive(self.id)
    }

    /// Attaches `component`, replacing any existing `T`.
    pub fn add_component<T: Component>(&mut self, component: T) -> Result<&mut Self, EcsError> {
        self.registry.add_component(self.id, component)?;
        Ok(self)
    }

    /// Detaches and returns the entity's `T`, if present.
    pub fn remove_component<T: Component>(&mut self) -> Result<Option<T>, EcsError> {
        self.registry.remove_component::<T>(self.id)
    }

    /// Returns `true` if the entity carries a `T`.
    pub fn has_component<T: Component>(&self) -> bool {
        self.registry.has_component::<T>(self.id)
    }

    /// Returns the entity's `T`, if present.
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.registry.get_component::<T>(self.id)
    }

    /// Returns the entity's `T` mutably, if present.
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.registry.get_component_mut::<T>(self.id)
    }

    /// Returns the entity's `T`.
    ///
    /// # Panics
    ///
    /// Panics if the entity does not carry a `T`.
    pub fn component<T: Component>(&self) -> &T {
        self.registry.component::<T>(self.id)
    }

    /// Returns the entity's `T` mutably.
    ///
    /// # Panics
    ///
    /// Panics if the entity does not carry a `T`.
    pub fn component_mut<T: Component>(&mut self) -> &mut T {
        self.registry.component_mut::<T>(self.id)
    }

    /// Marks the entity for destruction at the next commit.
    pub fn kill(&mut self) {
        self.registry.kill_entity(self.id);
    }

    /// Gives the entity the tag `tag`, taking it from any other holder.
    pub fn tag(&mut self, tag: impl Into<String>) -> Result<&mut Self, EcsError> {
        self.registry.tag_entity(self.id, tag)?;
        Ok(self)
    }

    /// Returns `true` if the entity holds the tag `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.registry.entity_has_tag(self.id, tag)
    }

    /// Moves the entity into the group `group`, leaving its previous group.
    pub fn group(&mut self, group: impl Into<String>) -> Result<&mut Self, EcsError> {
        self.registry.group_entity(self.id, group)?;
        Ok(self)
    }

    /// Returns `true` if the entity belongs to the group `group`.
    pub fn belongs_to_group(&self, group: &str) -> bool {
        self.registry.entity_belongs_to_group(self.id, group)
    }
}

impl PartialEq for EntityRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.id).finish()
    }
}

impl fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityMut").field(&self.id).finish()
    }
}
