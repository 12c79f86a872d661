//! Performance benchmarks for critical game systems

use bincode::{deserialize, serialize};
use rand::rngs::StdRng;
use rand::SeedableRng;
use server::collision::check_move;
use server::config::{GameConfig, TickOrder};
use server::game::GameState;
use server::spawner;
use server::world::World;
use shared::{Cell, Direction, Packet, Snake};
use std::time::Instant;

fn long_snake(id: u32, row: i32, length: i32) -> Snake {
    let mut snake = Snake::new(
        id,
        format!("bench{}", id),
        "#00ff00".to_string(),
        Cell::new(length - 1, row),
        Direction::Right,
    );
    for x in (0..length - 1).rev() {
        snake.body.push_back(Cell::new(x, row));
    }
    snake
}

/// Benchmarks move legality checks against a crowded world
#[test]
fn benchmark_collision_checks() {
    let mut world = World::new(45, 30);
    for row in 0..20 {
        world.add_snake(long_snake(row as u32 + 1, row, 20));
    }
    for x in 0..12 {
        world.rocks.push(Cell::new(30 + x % 6, 25 + x / 6));
    }

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let _ = check_move(&world, i % 20, Cell::new(25, (i % 30) as i32), false);
    }

    let duration = start.elapsed();
    println!(
        "Collision checks: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds even in debug builds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks full movement steps with many snakes
#[test]
fn benchmark_movement_steps() {
    for order in [TickOrder::Sequential, TickOrder::Simultaneous] {
        let config = GameConfig {
            speed_divisor: 1,
            tick_order: order,
            ..GameConfig::default()
        };
        let mut game = GameState::with_seed(config, 5);
        game.start();
        for id in 1..=32 {
            game.create_snake(id, "bench");
        }

        let iterations = 1_000;
        let start = Instant::now();

        for i in 0..iterations {
            let direction = Direction::ALL[i % 4];
            for id in 1..=32u32 {
                if (i as u32 + id) % 7 == 0 {
                    game.queue_direction(id, direction);
                }
            }
            game.step();
        }

        let duration = start.elapsed();
        println!(
            "{:?} steps: {} steps in {:?} ({:.2} μs/step)",
            order,
            iterations,
            duration,
            duration.as_micros() as f64 / iterations as f64
        );

        assert_eq!(game.tick, iterations as u32);
        // Should stay far below one 60Hz frame per step
        assert!(duration.as_millis() < 2000);
    }
}

/// Benchmarks placement on a nearly full grid, where most samples miss
#[test]
fn benchmark_placement_on_crowded_grid() {
    let mut world = World::new(45, 30);
    for row in 0..30 {
        world.add_snake(long_snake(row as u32 + 1, row, 44));
    }
    let mut rng = StdRng::seed_from_u64(11);

    let iterations = 10_000;
    let start = Instant::now();
    let mut placed = 0;

    for _ in 0..iterations {
        if spawner::try_place(&world, &mut rng, 50, None).is_some() {
            placed += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Crowded placement: {} iterations in {:?}, {} placed ({:.2} μs/iter)",
        iterations,
        duration,
        placed,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks snapshot encoding and decoding for a busy world
#[test]
fn benchmark_snapshot_serialization() {
    let mut world = World::new(45, 30);
    for row in 0..16 {
        world.add_snake(long_snake(row as u32 + 1, row * 2, 30));
    }
    for i in 0..5 {
        world.food.push(Cell::new(40, i));
        world.coins.push(Cell::new(41, i));
    }
    world.running = true;
    let packet = Packet::GameUpdate {
        snapshot: world.snapshot(),
    };

    let iterations = 1_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let data = serialize(&packet).unwrap();
        let _: Packet = deserialize(&data).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot serialization: {} round trips in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 3000);
}
