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

//! Well-known tag and group names the gameplay systems react to.

/// Tag of the entity controlled by the player.
pub const PLAYER: &str = "player";

/// Group of hostile entities that take damage from friendly projectiles.
pub const ENEMIES: &str = "enemies";

/// Group of static entities enemies bounce off.
pub const OBSTACLES: &str = "obstacles";

/// Group every emitted projectile joins.
pub const PROJECTILES: &str = "projectiles";
