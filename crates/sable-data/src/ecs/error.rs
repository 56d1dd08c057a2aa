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

//! Recoverable errors reported by the registry.

use sable_core::ecs::entity::EntityId;
use thiserror::Error;

/// Errors returned by [`Registry`](super::Registry) operations that a caller can recover from.
///
/// Contract violations, such as reading a component an entity does not have through
/// the panicking accessors, are not represented here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle refers to an entity that was destroyed, possibly with its index since recycled.
    #[error("entity {0} is not alive")]
    DeadEntity(EntityId),

    /// No system of the requested type has been added to the registry.
    #[error("system `{0}` is not registered")]
    SystemNotRegistered(&'static str),

    /// A system of the same type has already been added.
    #[error("system `{0}` is already registered")]
    SystemAlreadyRegistered(&'static str),

    /// The system is checked out by [`Registry::run_system`](super::Registry::run_system).
    #[error("system `{0}` is currently running")]
    SystemRunning(&'static str),
}
