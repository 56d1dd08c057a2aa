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

//! Component marker trait and the process-wide component type numbering.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use super::signature::MAX_COMPONENTS;

/// A marker trait for types that can be used as components in the ECS.
///
/// This trait must be implemented for any struct you wish to attach to an entity.
/// The `'static` lifetime ensures that the component type does not contain any
/// non-static references.
pub trait Component: 'static + Send + Sync {}

/// A dense integer identifying a component type, usable as a [`Signature`](super::Signature) bit.
pub type ComponentIndex = usize;

struct ComponentTable {
    by_type: HashMap<TypeId, ComponentIndex>,
    names: Vec<&'static str>,
}

static COMPONENT_TABLE: OnceLock<RwLock<ComponentTable>> = OnceLock::new();

fn component_table() -> &'static RwLock<ComponentTable> {
    COMPONENT_TABLE.get_or_init(|| {
        RwLock::new(ComponentTable {
            by_type: HashMap::new(),
            names: Vec::new(),
        })
    })
}

/// Returns the index assigned to component type `T`, assigning the next free one on first use.
///
/// Indices are shared by every registry in the process and never change once assigned.
///
/// # Panics
///
/// Panics if more than [`MAX_COMPONENTS`] distinct component types are used.
pub fn component_index<T: Component>() -> ComponentIndex {
    let type_id = TypeId::of::<T>();
    let table = component_table();

    if let Some(&index) = table
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .by_type
        .get(&type_id)
    {
        return index;
    }

    let mut table = table.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    // Another caller may have registered `T` between the two locks.
    if let Some(&index) = table.by_type.get(&type_id) {
        return index;
    }

    let index = table.names.len();
    assert!(
        index < MAX_COMPONENTS,
        "cannot register component `{}`: MAX_COMPONENTS ({MAX_COMPONENTS}) exceeded",
        type_name::<T>()
    );
    table.by_type.insert(type_id, index);
    table.names.push(type_name::<T>());
    log::trace!("Component `{}` assigned index {}", type_name::<T>(), index);
    index
}

/// Returns the type name registered for `index`, if any.
pub(crate) fn component_name(index: ComponentIndex) -> Option<&'static str> {
    component_table()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .names
        .get(index)
        .copied()
}
