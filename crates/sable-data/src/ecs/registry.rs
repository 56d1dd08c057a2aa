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

//! The authoritative owner of entities, components, tags, groups and systems.

use std::any::{type_name, TypeId};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

use sable_core::ecs::entity::EntityId;

use super::component::{component_index, component_name, Component};
use super::entity::{EntityMut, EntityRef};
use super::error::EcsError;
use super::pool::{ComponentPool, ErasedPool};
use super::signature::Signature;
use super::system::{AsAny, System};

/// Where an entity index currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityState {
    /// In the free list. Not addressable.
    Free,
    /// Created since the last commit. Addressable but invisible to systems.
    PendingCreate,
    /// Committed. Tracked by every system it matches.
    Active,
    /// Marked by `kill`. Still addressable until the next commit.
    PendingKill,
}

/// A membership change held back while its system is checked out.
#[derive(Debug, Clone, Copy)]
enum MembershipChange {
    Add(EntityId),
    Remove(EntityId),
}

struct SystemEntry {
    type_id: TypeId,
    name: &'static str,
    signature: Signature,
    /// The membership the system will have once every deferred change is applied.
    tracked: HashSet<EntityId>,
    /// `None` while the system is checked out by `run_system`.
    system: Option<Box<dyn System>>,
    deferred: Vec<MembershipChange>,
}

impl SystemEntry {
    /// Brings membership of `id` in line with `matches`.
    fn sync(&mut self, id: EntityId, matches: bool) {
        let change = if matches {
            if !self.tracked.insert(id) {
                return;
            }
            MembershipChange::Add(id)
        } else {
            if !self.tracked.remove(&id) {
                return;
            }
            MembershipChange::Remove(id)
        };

        match self.system.as_deref_mut() {
            Some(system) => apply_change(system, change),
            None => self.deferred.push(change),
        }
    }

    /// Drops every tracked entity in `dying`, touching the ordered list once.
    fn release(&mut self, dying: &HashSet<EntityId>) {
        let mut released = false;
        for &id in dying {
            if self.tracked.remove(&id) {
                released = true;
                if self.system.is_none() {
                    self.deferred.push(MembershipChange::Remove(id));
                }
            }
        }
        if released {
            if let Some(system) = self.system.as_deref_mut() {
                system.base_mut().remove_entities(dying);
            }
        }
    }
}

/// The index for a brand new slot, given the number of slots already allocated.
pub(super) fn fresh_index(allocated: usize) -> u32 {
    u32::try_from(allocated).expect("entity index space exhausted")
}

fn apply_change(system: &mut dyn System, change: MembershipChange) {
    match change {
        MembershipChange::Add(id) => system.base_mut().add_entity(id),
        MembershipChange::Remove(id) => system.base_mut().remove_entity(id),
    }
}

/// The central ECS container.
///
/// # Lifecycle
///
/// [`create_entity`](Self::create_entity) hands out an id immediately, but the new entity is
/// only offered to systems at the next [`update`](Self::update). [`kill_entity`](Self::kill_entity)
/// only marks an entity; its components, tag, group and system memberships are released at the
/// next `update`, after which the index returns to the free list with a bumped generation.
///
/// Adding or removing a component on a committed entity reconciles its system memberships
/// immediately.
pub struct Registry {
    generations: Vec<u32>,
    states: Vec<EntityState>,
    signatures: Vec<Signature>,
    free_indices: BinaryHeap<Reverse<u32>>,
    pending_create: Vec<EntityId>,
    pending_kill: Vec<EntityId>,
    live_count: usize,

    /// Indexed by `ComponentIndex`.
    pools: Vec<Option<Box<dyn ErasedPool>>>,

    systems: Vec<SystemEntry>,
    system_lookup: HashMap<TypeId, usize>,

    entity_by_tag: HashMap<String, EntityId>,
    tag_by_entity: HashMap<EntityId, String>,
    entities_by_group: HashMap<String, Vec<EntityId>>,
    group_by_entity: HashMap<EntityId, String>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            states: Vec::new(),
            signatures: Vec::new(),
            free_indices: BinaryHeap::new(),
            pending_create: Vec::new(),
            pending_kill: Vec::new(),
            live_count: 0,
            pools: Vec::new(),
            systems: Vec::new(),
            system_lookup: HashMap::new(),
            entity_by_tag: HashMap::new(),
            tag_by_entity: HashMap::new(),
            entities_by_group: HashMap::new(),
            group_by_entity: HashMap::new(),
        }
    }

    // --- Entity lifecycle ---

    fn state_of(&self, id: EntityId) -> Option<EntityState> {
        let slot = id.slot();
        if self.generations.get(slot).copied() != Some(id.generation) {
            return None;
        }
        match self.states[slot] {
            EntityState::Free => None,
            state => Some(state),
        }
    }

    fn require_alive(&self, id: EntityId, operation: &str) -> Result<EntityState, EcsError> {
        self.state_of(id).ok_or_else(|| {
            log::warn!("{operation} on dead entity {id} ignored");
            EcsError::DeadEntity(id)
        })
    }

    /// Allocates a new entity in the pending-create state.
    ///
    /// The lowest free index is reused first. The entity can receive components right away
    /// but no system sees it before the next [`update`](Self::update).
    ///
    /// # Panics
    ///
    /// Panics if every `u32` index is in use.
    pub fn create_entity(&mut self) -> EntityId {
        let id = match self.free_indices.pop() {
            Some(Reverse(index)) => {
                let slot = index as usize;
                self.states[slot] = EntityState::PendingCreate;
                EntityId::new(index, self.generations[slot])
            }
            None => {
                let index = fresh_index(self.generations.len());
                self.generations.push(0);
                self.states.push(EntityState::PendingCreate);
                self.signatures.push(Signature::new());
                EntityId::new(index, 0)
            }
        };

        self.pending_create.push(id);
        self.live_count += 1;
        log::trace!("Entity {id} created");
        id
    }

    /// Creates an entity and returns a mutable handle to it.
    pub fn spawn(&mut self) -> EntityMut<'_> {
        let id = self.create_entity();
        EntityMut::new(id, self)
    }

    /// Marks `id` for destruction at the next [`update`](Self::update).
    ///
    /// Killing an entity that is already marked, or that no longer exists, has no effect.
    pub fn kill_entity(&mut self, id: EntityId) {
        match self.state_of(id) {
            Some(EntityState::PendingCreate) | Some(EntityState::Active) => {
                self.states[id.slot()] = EntityState::PendingKill;
                self.pending_kill.push(id);
                log::trace!("Entity {id} marked for destruction");
            }
            Some(EntityState::PendingKill) => {}
            Some(EntityState::Free) | None => {
                log::warn!("kill on dead entity {id} ignored");
            }
        }
    }

    /// The commit point. Call once per frame.
    ///
    /// Pending creations are offered to every system and become active, then pending
    /// destructions are removed from every system, every pool, the tag and group indices,
    /// and their indices are returned to the free list.
    pub fn update(&mut self) {
        let created = std::mem::take(&mut self.pending_create);
        let mut committed = 0usize;
        for id in created {
            // Skips entities killed before their creation was committed.
            if self.state_of(id) != Some(EntityState::PendingCreate) {
                continue;
            }
            self.states[id.slot()] = EntityState::Active;
            self.sync_memberships(id, true);
            committed += 1;
        }

        let killed = std::mem::take(&mut self.pending_kill);
        let destroyed = killed.len();
        if !killed.is_empty() {
            let dying: HashSet<EntityId> = killed.iter().copied().collect();
            for entry in &mut self.systems {
                entry.release(&dying);
            }
            self.release_groups(&dying);
            for id in killed {
                self.destroy(id);
            }
        }

        if committed > 0 || destroyed > 0 {
            log::trace!("Registry commit: {committed} created, {destroyed} destroyed");
        }
    }

    /// Frees the slot of `id`. Systems and groups must already have let go of it.
    fn destroy(&mut self, id: EntityId) {
        let slot = id.slot();
        for pool in self.pools.iter_mut().flatten() {
            pool.remove_erased(slot);
        }
        self.signatures[slot].reset();
        self.remove_entity_tag(id);

        self.states[slot] = EntityState::Free;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free_indices.push(Reverse(id.index));
        self.live_count -= 1;
        log::trace!("Entity {id} destroyed");
    }

    /// Returns `true` while `id` is addressable: created and not yet destroyed by a commit.
    ///
    /// Entities marked by `kill` remain alive until the next commit.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.state_of(id).is_some()
    }

    /// Returns `true` if `id` was created since the last commit.
    pub fn is_pending_create(&self, id: EntityId) -> bool {
        self.state_of(id) == Some(EntityState::PendingCreate)
    }

    /// Returns `true` if `id` has been committed and is not marked for destruction.
    pub fn is_active(&self, id: EntityId) -> bool {
        self.state_of(id) == Some(EntityState::Active)
    }

    /// Returns `true` if `id` is marked for destruction at the next commit.
    pub fn is_pending_kill(&self, id: EntityId) -> bool {
        self.state_of(id) == Some(EntityState::PendingKill)
    }

    /// Number of alive entities, pending ones included.
    pub fn entity_count(&self) -> usize {
        self.live_count
    }

    /// Number of indices waiting in the free list.
    pub fn free_count(&self) -> usize {
        self.free_indices.len()
    }

    /// The component signature of `id`, if alive.
    pub fn signature_of(&self, id: EntityId) -> Option<&Signature> {
        self.state_of(id).map(|_| &self.signatures[id.slot()])
    }

    /// Iterates over committed entities that are not marked for destruction, by index.
    pub fn active_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == EntityState::Active)
            .map(|(slot, _)| EntityId::new(slot as u32, self.generations[slot]))
    }

    /// A read-only handle to `id`.
    pub fn entity(&self, id: EntityId) -> EntityRef<'_> {
        EntityRef::new(id, self)
    }

    /// A mutable handle to `id`.
    pub fn entity_mut(&mut self, id: EntityId) -> EntityMut<'_> {
        EntityMut::new(id, self)
    }

    // --- Components ---

    fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        self.pools
            .get(component_index::<T>())?
            .as_deref()?
            .as_any()
            .downcast_ref::<ComponentPool<T>>()
    }

    fn pool_mut<T: Component>(&mut self) -> Option<&mut ComponentPool<T>> {
        self.pools
            .get_mut(component_index::<T>())?
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
    }

    fn pool_or_insert<T: Component>(&mut self) -> &mut ComponentPool<T> {
        let index = component_index::<T>();
        if index >= self.pools.len() {
            self.pools.resize_with(index + 1, || None);
        }
        let pool: &mut dyn ErasedPool = &mut **self.pools[index].get_or_insert_with(|| {
            log::debug!("Created pool for component `{}`", type_name::<T>());
            Box::new(ComponentPool::<T>::new())
        });
        let stored = pool.type_name();
        match pool.as_any_mut().downcast_mut::<ComponentPool<T>>() {
            Some(pool) => pool,
            None => panic!(
                "pool at index {index} does not store `{}` but `{stored}`",
                type_name::<T>()
            ),
        }
    }

    /// Attaches `component` to `id`, replacing any existing `T`.
    ///
    /// On a committed entity, system memberships are reconciled before this returns.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> Result<(), EcsError> {
        let state = self.require_alive(id, "add_component")?;
        let index = component_index::<T>();
        self.pool_or_insert::<T>().set(id.slot(), component);
        self.signatures[id.slot()].set(index);
        log::trace!("Component `{}` added to {id}", type_name::<T>());
        self.reconcile(id, state);
        Ok(())
    }

    /// Detaches and returns the `T` of `id`, if it has one.
    ///
    /// On a committed entity, system memberships are reconciled before this returns.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Result<Option<T>, EcsError> {
        let state = self.require_alive(id, "remove_component")?;
        let removed = self.pool_mut::<T>().and_then(|pool| pool.remove(id.slot()));
        if removed.is_some() {
            self.signatures[id.slot()].clear(component_index::<T>());
            log::trace!("Component `{}` removed from {id}", type_name::<T>());
            self.reconcile(id, state);
        }
        Ok(removed)
    }

    /// Returns `true` if `id` is alive and carries a `T`.
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.get_component::<T>(id).is_some()
    }

    /// Returns the `T` of `id`, if alive and present.
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.state_of(id)?;
        self.pool::<T>()?.get(id.slot())
    }

    /// Returns the `T` of `id` mutably, if alive and present.
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.state_of(id)?;
        self.pool_mut::<T>()?.get_mut(id.slot())
    }

    /// Returns the `T` of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is dead or does not carry a `T`. Systems may rely on their required
    /// components being present for every tracked entity.
    pub fn component<T: Component>(&self, id: EntityId) -> &T {
        match self.get_component::<T>(id) {
            Some(component) => component,
            None => panic!("entity {id} has no component `{}`", type_name::<T>()),
        }
    }

    /// Returns the `T` of `id` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` is dead or does not carry a `T`.
    pub fn component_mut<T: Component>(&mut self, id: EntityId) -> &mut T {
        match self.get_component_mut::<T>(id) {
            Some(component) => component,
            None => panic!("entity {id} has no component `{}`", type_name::<T>()),
        }
    }

    /// The names of the component types `id` carries, for diagnostics.
    pub fn component_names(&self, id: EntityId) -> Vec<&'static str> {
        self.signature_of(id)
            .map(|sig| sig.iter().filter_map(component_name).collect())
            .unwrap_or_default()
    }

    fn reconcile(&mut self, id: EntityId, state: EntityState) {
        match state {
            EntityState::Active => self.sync_memberships(id, true),
            // Only removals apply: a dying entity must not join new systems.
            EntityState::PendingKill => self.sync_memberships(id, false),
            EntityState::PendingCreate | EntityState::Free => {}
        }
    }

    fn sync_memberships(&mut self, id: EntityId, allow_join: bool) {
        let signature = self.signatures[id.slot()];
        for entry in &mut self.systems {
            let matches = signature.is_superset_of(&entry.signature);
            if matches && !allow_join && !entry.tracked.contains(&id) {
                continue;
            }
            entry.sync(id, matches);
        }
    }

    // --- Systems ---

    /// Adds `system` to the registry and fills it with every active entity it matches.
    pub fn add_system<S: System>(&mut self, mut system: S) -> Result<(), EcsError> {
        let type_id = TypeId::of::<S>();
        let name = system.name();
        if self.system_lookup.contains_key(&type_id) {
            return Err(EcsError::SystemAlreadyRegistered(name));
        }

        let signature = *system.base().signature();
        system.base_mut().clear_entities();
        let mut tracked = HashSet::new();
        for id in self.active_entities() {
            if self.signatures[id.slot()].is_superset_of(&signature) {
                tracked.insert(id);
                system.base_mut().add_entity(id);
            }
        }

        log::debug!(
            "System `{name}` registered ({} entities matched)",
            system.base().len()
        );
        self.system_lookup.insert(type_id, self.systems.len());
        self.systems.push(SystemEntry {
            type_id,
            name,
            signature,
            tracked,
            system: Some(Box::new(system)),
            deferred: Vec::new(),
        });
        Ok(())
    }

    /// Returns `true` if a system of type `S` has been added.
    pub fn has_system<S: System>(&self) -> bool {
        self.system_lookup.contains_key(&TypeId::of::<S>())
    }

    /// Returns the system of type `S`, unless it is absent or currently running.
    pub fn get_system<S: System>(&self) -> Option<&S> {
        let slot = *self.system_lookup.get(&TypeId::of::<S>())?;
        let system: &dyn System = self.systems[slot].system.as_deref()?;
        system.as_any().downcast_ref::<S>()
    }

    /// Returns the system of type `S` mutably, unless it is absent or currently running.
    pub fn get_system_mut<S: System>(&mut self) -> Option<&mut S> {
        let slot = *self.system_lookup.get(&TypeId::of::<S>())?;
        let system: &mut dyn System = self.systems[slot].system.as_deref_mut()?;
        system.as_any_mut().downcast_mut::<S>()
    }

    /// Removes the system of type `S` and returns it with an empty tracked list.
    pub fn remove_system<S: System>(&mut self) -> Result<S, EcsError> {
        let name = type_name::<S>();
        let slot = *self
            .system_lookup
            .get(&TypeId::of::<S>())
            .ok_or(EcsError::SystemNotRegistered(name))?;
        if self.systems[slot].system.is_none() {
            return Err(EcsError::SystemRunning(self.systems[slot].name));
        }

        let entry = self.systems.remove(slot);
        self.system_lookup = self
            .systems
            .iter()
            .enumerate()
            .map(|(i, e)| (e.type_id, i))
            .collect();

        let Some(mut system) = entry.system else {
            return Err(EcsError::SystemRunning(entry.name));
        };
        system.base_mut().clear_entities();
        log::debug!("System `{}` removed", entry.name);
        match system.into_any().downcast::<S>() {
            Ok(system) => Ok(*system),
            Err(_) => Err(EcsError::SystemNotRegistered(name)),
        }
    }

    /// Runs `f` with the system of type `S` checked out of the registry.
    ///
    /// While `f` runs, the registry stays fully usable. Membership changes that concern `S`
    /// are held back and applied, in order, once `f` returns, so the tracked list `f` iterates
    /// never changes under it. Every other system is reconciled immediately as usual.
    ///
    /// # Panics
    ///
    /// Panics if `S` is not registered or is already running.
    pub fn run_system<S: System, R>(&mut self, f: impl FnOnce(&mut S, &mut Registry) -> R) -> R {
        let type_id = TypeId::of::<S>();
        let Some(&slot) = self.system_lookup.get(&type_id) else {
            panic!("system `{}` is not registered", type_name::<S>());
        };
        let Some(mut system) = self.systems[slot].system.take() else {
            panic!("system `{}` is already running", type_name::<S>());
        };

        let running: &mut dyn System = &mut *system;
        let result = match running.as_any_mut().downcast_mut::<S>() {
            Some(concrete) => f(concrete, self),
            None => panic!("system slot for `{}` holds another type", type_name::<S>()),
        };

        // Other systems may have been removed meanwhile, so the slot is looked up again.
        if let Some(&slot) = self.system_lookup.get(&type_id) {
            let entry = &mut self.systems[slot];
            for change in entry.deferred.drain(..) {
                apply_change(&mut *system, change);
            }
            entry.system = Some(system);
        }
        result
    }

    /// Names of the registered systems, in registration order.
    pub fn system_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.iter().map(|entry| entry.name)
    }

    // --- Tags ---

    /// Gives `id` the tag `tag`.
    ///
    /// A tag has at most one holder: an entity already holding `tag` loses it. An entity has
    /// at most one tag: any previous tag of `id` is released.
    pub fn tag_entity(&mut self, id: EntityId, tag: impl Into<String>) -> Result<(), EcsError> {
        self.require_alive(id, "tag_entity")?;
        let tag = tag.into();
        if self.tag_by_entity.get(&id) == Some(&tag) {
            return Ok(());
        }

        self.remove_entity_tag(id);
        if let Some(previous) = self.entity_by_tag.insert(tag.clone(), id) {
            self.tag_by_entity.remove(&previous);
            log::debug!("Tag `{tag}` moved from {previous} to {id}");
        }
        self.tag_by_entity.insert(id, tag);
        Ok(())
    }

    /// Returns `true` if `id` holds the tag `tag`.
    pub fn entity_has_tag(&self, id: EntityId, tag: &str) -> bool {
        self.tag_by_entity.get(&id).is_some_and(|t| t == tag)
    }

    /// Returns the holder of `tag`, if any.
    pub fn get_entity_by_tag(&self, tag: &str) -> Option<EntityId> {
        self.entity_by_tag.get(tag).copied()
    }

    /// Returns the tag held by `id`, if any.
    pub fn tag_of(&self, id: EntityId) -> Option<&str> {
        self.tag_by_entity.get(&id).map(String::as_str)
    }

    /// Releases the tag held by `id`, returning it.
    pub fn remove_entity_tag(&mut self, id: EntityId) -> Option<String> {
        let tag = self.tag_by_entity.remove(&id)?;
        self.entity_by_tag.remove(&tag);
        Some(tag)
    }

    // --- Groups ---

    /// Moves `id` into the group `group`, leaving any group it belonged to.
    pub fn group_entity(&mut self, id: EntityId, group: impl Into<String>) -> Result<(), EcsError> {
        self.require_alive(id, "group_entity")?;
        let group = group.into();
        if self.group_by_entity.get(&id) == Some(&group) {
            return Ok(());
        }

        self.remove_entity_group(id);
        self.entities_by_group.entry(group.clone()).or_default().push(id);
        self.group_by_entity.insert(id, group);
        Ok(())
    }

    /// Returns `true` if `id` belongs to `group`.
    pub fn entity_belongs_to_group(&self, id: EntityId, group: &str) -> bool {
        self.group_by_entity.get(&id).is_some_and(|g| g == group)
    }

    /// The members of `group`, in the order they joined.
    pub fn get_entities_by_group(&self, group: &str) -> Vec<EntityId> {
        self.entities_by_group.get(group).cloned().unwrap_or_default()
    }

    /// Returns the group `id` belongs to, if any.
    pub fn group_of(&self, id: EntityId) -> Option<&str> {
        self.group_by_entity.get(&id).map(String::as_str)
    }

    /// Removes `id` from its group, returning the group name.
    ///
    /// Linear in the size of the group, which keeps its join order.
    pub fn remove_entity_group(&mut self, id: EntityId) -> Option<String> {
        let group = self.group_by_entity.remove(&id)?;
        if let Some(members) = self.entities_by_group.get_mut(&group) {
            members.retain(|member| *member != id);
            if members.is_empty() {
                self.entities_by_group.remove(&group);
            }
        }
        Some(group)
    }

    fn release_groups(&mut self, dying: &HashSet<EntityId>) {
        let mut touched = HashSet::new();
        for id in dying {
            if let Some(group) = self.group_by_entity.remove(id) {
                touched.insert(group);
            }
        }
        for group in touched {
            if let Some(members) = self.entities_by_group.get_mut(&group) {
                members.retain(|member| !dying.contains(member));
                if members.is_empty() {
                    self.entities_by_group.remove(&group);
                }
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.live_count)
            .field("free", &self.free_indices.len())
            .field("pending_create", &self.pending_create.len())
            .field("pending_kill", &self.pending_kill.len())
            .field("pools", &self.pools.iter().flatten().count())
            .field("systems", &self.systems.iter().map(|e| e.name).collect::<Vec<_>>())
            .finish()
    }
}
