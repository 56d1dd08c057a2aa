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

//! Integration tests driving the gameplay systems through [`Game::frame`].

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use approx::assert_relative_eq;
use sable_sdk::prelude::*;
use sable_sdk::script::{set_entity_rotation, set_entity_velocity};
use sable_sdk::systems::CollisionSystem;
use sable_sdk::tags;

const FRAME: f64 = 0.1;

/// Commits everything spawned so far, as a level load would.
fn commit(game: &mut Game) {
    game.registry_mut().update();
}

fn spawn_enemy(registry: &mut Registry, position: Vec2) -> Entity {
    registry
        .spawn()
        .group(tags::ENEMIES)
        .unwrap()
        .add_component(Transform::at(position))
        .unwrap()
        .add_component(BoxCollider::new(16.0, 16.0))
        .unwrap()
        .add_component(Health::default())
        .unwrap()
        .id()
}

fn spawn_projectile(registry: &mut Registry, position: Vec2, is_friendly: bool, duration_ms: u64) -> Entity {
    registry
        .spawn()
        .group(tags::PROJECTILES)
        .unwrap()
        .add_component(Transform::at(position))
        .unwrap()
        .add_component(BoxCollider::new(4.0, 4.0))
        .unwrap()
        .add_component(Projectile {
            is_friendly,
            hit_percent_damage: 10,
            duration_ms,
            start_time_ms: 0,
        })
        .unwrap()
        .id()
}

#[test]
fn moving_entities_integrate_their_velocity() {
    let mut game = Game::default();
    let e = game
        .registry_mut()
        .spawn()
        .add_component(Transform::at(Vec2::new(100.0, 100.0)))
        .unwrap()
        .add_component(RigidBody {
            velocity: Vec2::new(50.0, -20.0),
        })
        .unwrap()
        .id();
    commit(&mut game);

    game.frame(FRAME);

    let position = game.registry().component::<Transform>(e).position;
    assert_relative_eq!(position.x, 105.0, epsilon = 1e-4);
    assert_relative_eq!(position.y, 98.0, epsilon = 1e-4);
}

#[test]
fn overlapping_pair_collides_once_regardless_of_creation_order() {
    for reversed in [false, true] {
        // --- SETUP ---
        let mut registry = Registry::new();
        registry.add_system(CollisionSystem::new()).unwrap();
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        bus.subscribe_fn(move |_: &mut CollisionEvent| seen.set(seen.get() + 1));

        let positions = if reversed {
            [Vec2::new(5.0, 5.0), Vec2::new(0.0, 0.0)]
        } else {
            [Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0)]
        };
        for position in positions {
            registry
                .spawn()
                .add_component(Transform::at(position))
                .unwrap()
                .add_component(RigidBody::default())
                .unwrap()
                .add_component(BoxCollider::new(10.0, 10.0))
                .unwrap();
        }
        registry.update();

        // --- ACTION ---
        let emitted = registry.run_system(|system: &mut CollisionSystem, registry: &mut Registry| {
            system.update(registry, &bus)
        });

        // --- ASSERTIONS ---
        assert_eq!(emitted, 1);
        assert_eq!(count.get(), 1);
    }
}

#[test]
fn friendly_projectile_damages_an_enemy_once() {
    for projectile_first in [false, true] {
        let mut game = Game::default();
        let (enemy, projectile) = if projectile_first {
            let p = spawn_projectile(game.registry_mut(), Vec2::new(204.0, 204.0), true, 10_000);
            (spawn_enemy(game.registry_mut(), Vec2::new(200.0, 200.0)), p)
        } else {
            let e = spawn_enemy(game.registry_mut(), Vec2::new(200.0, 200.0));
            (e, spawn_projectile(game.registry_mut(), Vec2::new(204.0, 204.0), true, 10_000))
        };
        commit(&mut game);

        game.frame(FRAME);
        game.frame(FRAME);

        assert!(!game.registry().is_alive(projectile));
        assert_eq!(game.registry().component::<Health>(enemy).health_percentage, 90);
    }
}

#[test]
fn hostile_projectile_spares_enemies_and_kills_a_weak_player() {
    let mut game = Game::default();
    let enemy = spawn_enemy(game.registry_mut(), Vec2::new(200.0, 200.0));
    let stray = spawn_projectile(game.registry_mut(), Vec2::new(204.0, 204.0), false, 10_000);
    let player = game
        .registry_mut()
        .spawn()
        .tag(tags::PLAYER)
        .unwrap()
        .add_component(Transform::at(Vec2::new(400.0, 300.0)))
        .unwrap()
        .add_component(BoxCollider::new(16.0, 16.0))
        .unwrap()
        .add_component(Health { health_percentage: 5 })
        .unwrap()
        .id();
    let bullet = spawn_projectile(game.registry_mut(), Vec2::new(404.0, 304.0), false, 10_000);
    commit(&mut game);

    game.frame(FRAME);

    assert_eq!(game.registry().component::<Health>(enemy).health_percentage, 100);
    assert!(game.registry().is_alive(stray));
    assert!(!game.registry().is_alive(player));
    assert!(!game.registry().is_alive(bullet));
    assert_eq!(game.registry().get_entity_by_tag(tags::PLAYER), None);
}

#[test]
fn projectiles_expire_after_their_duration() {
    let mut game = Game::default();
    let projectile = spawn_projectile(game.registry_mut(), Vec2::new(10.0, 10.0), true, 150);
    commit(&mut game);

    game.frame(FRAME);
    assert!(game.registry().is_alive(projectile));

    game.frame(FRAME);
    assert!(!game.registry().is_alive(projectile));
    assert!(game.registry().get_entities_by_group(tags::PROJECTILES).is_empty());
}

#[test]
fn arrow_keys_set_velocity_and_sprite_row() {
    let mut game = Game::default();
    let hero = game
        .registry_mut()
        .spawn()
        .add_component(Transform::at(Vec2::new(100.0, 100.0)))
        .unwrap()
        .add_component(RigidBody::default())
        .unwrap()
        .add_component(Sprite::new("chopper", 32, 32, 2))
        .unwrap()
        .add_component(KeyboardControlled {
            up_velocity: Vec2::new(0.0, -80.0),
            right_velocity: Vec2::new(80.0, 0.0),
            down_velocity: Vec2::new(0.0, 80.0),
            left_velocity: Vec2::new(-80.0, 0.0),
        })
        .unwrap()
        .id();
    commit(&mut game);

    game.press_key(Key::Down);
    game.frame(FRAME);

    let registry = game.registry();
    assert_eq!(registry.component::<RigidBody>(hero).velocity, Vec2::new(0.0, 80.0));
    assert_eq!(registry.component::<Sprite>(hero).src_rect.y, 64.0);

    game.frame(FRAME);
    assert_relative_eq!(game.registry().component::<Transform>(hero).position.y, 108.0, epsilon = 1e-4);
}

#[test]
fn space_fires_a_projectile_in_the_players_heading() {
    let mut game = Game::default();
    game.registry_mut()
        .spawn()
        .tag(tags::PLAYER)
        .unwrap()
        .add_component(Transform::at(Vec2::new(100.0, 100.0)))
        .unwrap()
        .add_component(RigidBody {
            velocity: Vec2::new(30.0, 0.0),
        })
        .unwrap()
        .add_component(ProjectileEmitter {
            projectile_velocity: Vec2::new(200.0, 200.0),
            repeat_frequency_ms: 0,
            is_friendly: true,
            ..ProjectileEmitter::default()
        })
        .unwrap();
    commit(&mut game);

    game.frame(FRAME);
    assert!(game.registry().get_entities_by_group(tags::PROJECTILES).is_empty());

    game.press_key(Key::Space);
    game.frame(FRAME);

    let projectiles = game.registry().get_entities_by_group(tags::PROJECTILES);
    assert_eq!(projectiles.len(), 1);
    let registry = game.registry();
    assert_eq!(
        registry.component::<RigidBody>(projectiles[0]).velocity,
        Vec2::new(200.0, 0.0)
    );
    let projectile = registry.component::<Projectile>(projectiles[0]);
    assert!(projectile.is_friendly);
    assert_eq!(projectile.start_time_ms, game.elapsed_ms());
}

#[test]
fn leaving_the_map_kills_enemies_but_clamps_the_player() {
    let mut game = Game::default();
    let runaway = game
        .registry_mut()
        .spawn()
        .add_component(Transform::at(Vec2::new(890.0, 300.0)))
        .unwrap()
        .add_component(RigidBody {
            velocity: Vec2::new(200.0, 0.0),
        })
        .unwrap()
        .id();
    let player = game
        .registry_mut()
        .spawn()
        .tag(tags::PLAYER)
        .unwrap()
        .add_component(Transform::at(Vec2::new(790.0, 300.0)))
        .unwrap()
        .add_component(RigidBody {
            velocity: Vec2::new(500.0, 0.0),
        })
        .unwrap()
        .add_component(Sprite::new("chopper", 32, 32, 2))
        .unwrap()
        .id();
    commit(&mut game);

    game.frame(FRAME);

    assert!(!game.registry().is_alive(runaway));
    let position = game.registry().component::<Transform>(player).position;
    assert_relative_eq!(position.x, 768.0);
    assert_relative_eq!(position.y, 300.0);
}

#[test]
fn scripts_drive_entities_through_the_bridge() {
    let mut game = Game::default();
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let script: ScriptFn = Arc::new(
        move |registry: &mut Registry, entity: Entity, _delta_time: f64, _elapsed_ms: u64| {
            counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            set_entity_velocity(registry, entity, 30.0, 0.0).unwrap();
            set_entity_rotation(registry, entity, 45.0).unwrap();
        },
    );
    let ghost_script: ScriptFn = Arc::new(
        |registry: &mut Registry, entity: Entity, _delta_time: f64, _elapsed_ms: u64| {
            assert!(set_entity_velocity(registry, entity, 1.0, 1.0).is_err());
        },
    );

    let mover = game
        .registry_mut()
        .spawn()
        .add_component(Transform::at(Vec2::new(0.0, 0.0)))
        .unwrap()
        .add_component(RigidBody::default())
        .unwrap()
        .add_component(Script::new(script))
        .unwrap()
        .id();
    game.registry_mut()
        .spawn()
        .add_component(Transform::default())
        .unwrap()
        .add_component(Script::new(ghost_script))
        .unwrap();
    commit(&mut game);

    game.frame(FRAME);
    game.frame(FRAME);

    assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 2);
    let transform = game.registry().component::<Transform>(mover);
    assert_relative_eq!(transform.position.x, 3.0, epsilon = 1e-4);
    assert_relative_eq!(transform.rotation, 45.0);
}

#[test]
fn escape_stops_the_loop() {
    let mut game = Game::default();
    game.frame(FRAME);
    game.press_key(Key::Escape);

    assert_eq!(game.run_frames(100, FRAME), 1);
    assert!(!game.is_running());
    assert_eq!(game.frame_count(), 2);
}
