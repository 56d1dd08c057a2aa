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

//! Provides the 2D mathematics primitives used by the simulation.
//!
//! The runtime works in screen-space pixels with `f32` precision. All angular
//! values are expressed in **degrees**, matching the rotation carried by transforms.

mod rect;
mod vector;

pub use self::rect::Rect;
pub use self::vector::Vec2;
