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

//! Per-type component storage addressed directly by entity index.

use std::any::{type_name, Any};

/// A type-erased view of a [`ComponentPool`].
///
/// The registry keeps one pool per component type behind this trait and only
/// recovers the concrete `ComponentPool<T>` inside its typed accessors.
pub trait ErasedPool: Any {
    /// Casts the trait object to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Casts the trait object to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Drops the value stored for `index`, if any.
    fn remove_erased(&mut self, index: usize);

    /// Returns `true` if a value is stored for `index`.
    fn contains(&self, index: usize) -> bool;

    /// Returns the number of stored values.
    fn len(&self) -> usize;

    /// Returns `true` if the pool stores no value.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the name of the stored component type, for diagnostics.
    fn type_name(&self) -> &'static str;
}

/// Dense storage for a single component type.
///
/// Slot `i` holds the component of the entity whose index is `i`. The backing
/// vector grows to fit the largest index ever written and never shrinks.
#[derive(Debug)]
pub struct ComponentPool<T> {
    slots: Vec<Option<T>>,
    len: usize,
}

impl<T> ComponentPool<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty pool able to hold indices below `capacity` without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, len: 0 }
    }

    /// Stores `value` for `index`, growing the pool if needed.
    ///
    /// Returns the value previously stored for `index`, if any.
    pub fn set(&mut self, index: usize, value: T) -> Option<T> {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let previous = self.slots[index].replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Returns the value stored for `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Returns the value stored for `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Removes and returns the value stored for `index`.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let removed = self.slots.get_mut(index).and_then(Option::take);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Returns `true` if a value is stored for `index`.
    pub fn contains(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the pool stores no value.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of addressable slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over `(index, value)` for every stored value.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }
}

impl<T> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ErasedPool for ComponentPool<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove_erased(&mut self, index: usize) {
        self.remove(index);
    }

    fn contains(&self, index: usize) -> bool {
        ComponentPool::contains(self, index)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}
