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

//! Implements the entity/component/system runtime.
//!
//! The [`Registry`] is the single authority over entities. Entities are created in a
//! *pending* state so components can be attached before any system sees them, and
//! destroyed lazily: `kill` only marks an entity, and the next call to
//! [`Registry::update`] commits every pending creation and destruction at once.
//!
//! Systems own a [`SystemBase`] describing the components they require. The registry keeps
//! each system's tracked list in sync with entity signatures, so a system only ever iterates
//! entities that carry everything it needs.

mod component;
mod entity;
mod error;
mod pool;
mod registry;
mod signature;
mod system;

pub use component::{component_index, Component, ComponentIndex};
pub use entity::{Entity, EntityMut, EntityRef};
pub use error::EcsError;
pub use pool::{ComponentPool, ErasedPool};
pub use registry::Registry;
pub use signature::{Signature, MAX_COMPONENTS};
pub use system::{AsAny, System, SystemBase};
