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

//! The base contract shared by every system.

use std::any::{type_name, Any};
use std::collections::HashSet;

use sable_core::ecs::entity::EntityId;

use super::component::{component_index, Component};
use super::signature::Signature;

/// Conversion to `dyn Any`, implemented for every `'static` type.
///
/// This is what lets the registry hand back a concrete system from its type-erased storage.
pub trait AsAny: Any {
    /// Casts to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Casts to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Converts the box into `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A unit of per-frame logic operating on every entity that matches its [`SystemBase`] signature.
///
/// Implementors embed a `SystemBase` and expose it through [`System::base`]. The per-frame
/// update is an inherent method of each system, with whatever inputs it needs.
///
/// # Examples
///
/// ```
/// use sable_data::ecs::{Component, System, SystemBase};
///
/// struct Position(f32);
/// impl Component for Position {}
///
/// struct Gravity {
///     base: SystemBase,
/// }
///
/// impl System for Gravity {
///     fn base(&self) -> &SystemBase {
///         &self.base
///     }
///     fn base_mut(&mut self) -> &mut SystemBase {
///         &mut self.base
///     }
/// }
///
/// let gravity = Gravity { base: SystemBase::new().require::<Position>() };
/// assert!(gravity.tracked_entities().is_empty());
/// ```
pub trait System: AsAny {
    /// Returns the shared system state.
    fn base(&self) -> &SystemBase;

    /// Returns the shared system state mutably.
    fn base_mut(&mut self) -> &mut SystemBase;

    /// A human readable name used in logs and errors.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// The entities currently matching this system, in the order they started matching.
    fn tracked_entities(&self) -> &[EntityId] {
        self.base().tracked_entities()
    }
}

/// The state every system carries: its required [`Signature`] and its tracked entity list.
///
/// The signature is read once, when the system is added to a registry. Requirements
/// declared afterwards are ignored.
#[derive(Debug, Default, Clone)]
pub struct SystemBase {
    signature: Signature,
    entities: Vec<EntityId>,
}

impl SystemBase {
    /// Creates a system base with no requirements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SystemBase::require_component`].
    pub fn require<T: Component>(mut self) -> Self {
        self.require_component::<T>();
        self
    }

    /// Adds `T` to the components an entity must carry to be tracked by this system.
    pub fn require_component<T: Component>(&mut self) {
        debug_assert!(
            self.entities.is_empty(),
            "requirements must be declared before the system tracks entities"
        );
        self.signature.set(component_index::<T>());
    }

    /// The components this system requires.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The entities currently matching this system, in the order they started matching.
    pub fn tracked_entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Returns `true` if `entity` is tracked. Linear in the number of tracked entities.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity is tracked.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // The registry owns the membership set and only forwards actual changes, so these
    // never see a duplicate add or a removal of an untracked entity.

    pub(crate) fn add_entity(&mut self, entity: EntityId) {
        self.entities.push(entity);
    }

    /// Linear: the list keeps insertion order, so no swap-remove.
    pub(crate) fn remove_entity(&mut self, entity: EntityId) {
        if let Some(pos) = self.entities.iter().position(|e| *e == entity) {
            self.entities.remove(pos);
        }
    }

    /// Removes every entity in `entities` in a single pass.
    pub(crate) fn remove_entities(&mut self, entities: &HashSet<EntityId>) {
        self.entities.retain(|e| !entities.contains(e));
    }

    pub(crate) fn clear_entities(&mut self) {
        self.entities.clear();
    }
}
