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

//! Gameplay components.
//!
//! Components are plain data. Those that can appear in level files derive `serde`
//! traits; missing fields fall back to the [`Default`] implementation.

use std::fmt;

use sable_core::math::{Rect, Vec2};
use sable_data::ecs::Component;
use serde::{Deserialize, Serialize};

use crate::script::ScriptFn;

/// Position, scale and rotation (in degrees) of an entity in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Top-left corner in world pixels.
    pub position: Vec2,
    /// Scale applied to the sprite.
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl Transform {
    /// A transform at `position` with unit scale and no rotation.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Component for Transform {}

/// Linear velocity in pixels per second.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBody {
    /// Velocity in pixels per second.
    pub velocity: Vec2,
}

impl Component for RigidBody {}

/// Mirroring applied when drawing a sprite.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flip {
    /// Drawn as is.
    #[default]
    None,
    /// Mirrored left to right.
    Horizontal,
    /// Mirrored top to bottom.
    Vertical,
}

impl Flip {
    /// Toggles between `self` being unflipped and `flipped`.
    pub fn toggled(self, flipped: Flip) -> Flip {
        if self == Flip::None {
            flipped
        } else {
            Flip::None
        }
    }
}

/// A textured quad. The texture is referenced by asset id only; an id unknown to the
/// renderer draws nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Texture asset id.
    pub asset_id: String,
    /// Width in texture pixels.
    pub width: u32,
    /// Height in texture pixels.
    pub height: u32,
    /// Draw order; higher values draw on top.
    pub z_index: i32,
    /// Fixed sprites ignore the camera (user interface).
    pub is_fixed: bool,
    /// Region of the texture to draw.
    pub src_rect: Rect,
    /// Mirroring.
    pub flip: Flip,
}

impl Sprite {
    /// A sprite drawing the top-left `width` x `height` region of `asset_id`.
    pub fn new(asset_id: impl Into<String>, width: u32, height: u32, z_index: i32) -> Self {
        Self {
            asset_id: asset_id.into(),
            width,
            height,
            z_index,
            is_fixed: false,
            src_rect: Rect::new(0.0, 0.0, width as f32, height as f32),
            flip: Flip::None,
        }
    }

    /// Moves the source region to `(x, y)` in texture pixels.
    pub fn with_source_offset(mut self, x: f32, y: f32) -> Self {
        self.src_rect.x = x;
        self.src_rect.y = y;
        self
    }
}

impl Component for Sprite {}

/// An axis-aligned collision box relative to the entity's position.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxCollider {
    /// Width in world pixels.
    pub width: f32,
    /// Height in world pixels.
    pub height: f32,
    /// Offset from the transform position.
    pub offset: Vec2,
}

impl BoxCollider {
    /// A collider of the given size with no offset.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// The world-space rectangle covered by this collider for `transform`.
    pub fn bounds(&self, transform: &Transform) -> Rect {
        Rect::from_position_size(
            transform.position + self.offset,
            Vec2::new(self.width, self.height),
        )
    }
}

impl Component for BoxCollider {}

/// Remaining health. The entity dies when it reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Health {
    /// Health in percent.
    pub health_percentage: i32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            health_percentage: 100,
        }
    }
}

impl Component for Health {}

/// Emits projectiles periodically, and on demand for the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileEmitter {
    /// Velocity given to emitted projectiles.
    pub projectile_velocity: Vec2,
    /// Time between automatic emissions. Zero disables automatic emission.
    pub repeat_frequency_ms: u64,
    /// Lifetime of emitted projectiles.
    pub projectile_duration_ms: u64,
    /// Damage dealt by emitted projectiles, in health percent.
    pub hit_percent_damage: i32,
    /// Friendly projectiles hurt enemies, the others hurt the player.
    pub is_friendly: bool,
    /// Time of the last automatic emission.
    #[serde(skip)]
    pub last_emission_time_ms: u64,
}

impl Default for ProjectileEmitter {
    fn default() -> Self {
        Self {
            projectile_velocity: Vec2::ZERO,
            repeat_frequency_ms: 1000,
            projectile_duration_ms: 10_000,
            hit_percent_damage: 10,
            is_friendly: false,
            last_emission_time_ms: 0,
        }
    }
}

impl Component for ProjectileEmitter {}

/// A live projectile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    /// Friendly projectiles hurt enemies, the others hurt the player.
    pub is_friendly: bool,
    /// Damage dealt on hit, in health percent.
    pub hit_percent_damage: i32,
    /// Lifetime.
    pub duration_ms: u64,
    /// Time of emission.
    pub start_time_ms: u64,
}

impl Component for Projectile {}

/// Velocities applied when the arrow keys are pressed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardControlled {
    /// Velocity for the up arrow.
    pub up_velocity: Vec2,
    /// Velocity for the right arrow.
    pub right_velocity: Vec2,
    /// Velocity for the down arrow.
    pub down_velocity: Vec2,
    /// Velocity for the left arrow.
    pub left_velocity: Vec2,
}

impl Component for KeyboardControlled {}

/// Marks the entity the camera follows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraFollow;

impl Component for CameraFollow {}

/// Frame animation over the horizontal strip of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Animation {
    /// Number of frames in the strip.
    pub num_frames: u32,
    /// Frame currently displayed.
    pub current_frame: u32,
    /// Frames per second.
    pub frame_speed_rate: u32,
    /// Whether the animation restarts after the last frame.
    pub is_loop: bool,
    /// Time the animation started.
    pub start_time_ms: u64,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            num_frames: 1,
            current_frame: 0,
            frame_speed_rate: 1,
            is_loop: true,
            start_time_ms: 0,
        }
    }
}

impl Component for Animation {}

/// A line of text drawn with a font asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLabel {
    /// Position in screen or world pixels, depending on `is_fixed`.
    pub position: Vec2,
    /// The text.
    pub text: String,
    /// Font asset id.
    pub asset_id: String,
    /// RGBA color.
    pub color: [u8; 4],
    /// Fixed labels ignore the camera.
    pub is_fixed: bool,
}

impl Default for TextLabel {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            text: String::new(),
            asset_id: String::new(),
            color: [255, 255, 255, 255],
            is_fixed: true,
        }
    }
}

impl Component for TextLabel {}

/// Per-frame behavior attached to an entity.
#[derive(Clone)]
pub struct Script {
    /// Invoked once per frame by the script system.
    pub on_update: ScriptFn,
}

impl Script {
    /// Wraps `on_update`.
    pub fn new(on_update: ScriptFn) -> Self {
        Self { on_update }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script").finish_non_exhaustive()
    }
}

impl Component for Script {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collider_bounds_apply_offset() {
        let transform = Transform::at(Vec2::new(10.0, 20.0));
        let collider = BoxCollider {
            width: 4.0,
            height: 6.0,
            offset: Vec2::new(1.0, -1.0),
        };
        assert_eq!(collider.bounds(&transform), Rect::new(11.0, 19.0, 4.0, 6.0));
    }

    #[test]
    fn flip_toggles_back_to_none() {
        assert_eq!(Flip::None.toggled(Flip::Horizontal), Flip::Horizontal);
        assert_eq!(Flip::Horizontal.toggled(Flip::Vertical), Flip::None);
    }

    #[test]
    fn sprite_source_rect_matches_size() {
        let sprite = Sprite::new("tank", 32, 16, 1).with_source_offset(64.0, 0.0);
        assert_eq!(sprite.src_rect, Rect::new(64.0, 0.0, 32.0, 16.0));
    }
}
