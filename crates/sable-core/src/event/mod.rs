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

//! Provides foundational primitives for event-driven communication.
//!
//! Two primitives live here:
//! - [`EventBus`], a synchronous, type-routed publish/subscribe hub. Emitting an
//!   event runs every subscriber for that exact event type, in subscription order,
//!   before `emit` returns.
//! - [`EventChannel`], a generic MPSC queue for handing values across a boundary
//!   (platform input, or a subscriber that wants to process events later in its
//!   own update).
//!
//! Neither primitive knows about concrete event types, so higher-level crates can
//! define their own events without creating circular dependencies.

mod bus;
mod channel;

pub use self::bus::EventBus;
pub use self::channel::EventChannel;
