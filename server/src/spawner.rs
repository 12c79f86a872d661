//! Best-effort random placement of food, coins and obstacles.
//!
//! Every placement samples a bounded number of random cells and gives up
//! quietly when none of them is free. A skipped spawn is simply retried on a
//! later movement step.

use crate::config::GameConfig;
use crate::world::World;
use log::debug;
use rand::Rng;
use shared::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Food,
    Coin,
    Rock,
    Hole,
}

impl EntityKind {
    pub fn is_obstacle(&self) -> bool {
        matches!(self, EntityKind::Rock | EntityKind::Hole)
    }
}

/// Samples up to `max_attempts` random in-bounds cells and returns the first
/// free one. With a margin, cells closer than `margin` to the border are
/// rejected as well. Never mutates the world.
pub fn try_place<R: Rng>(
    world: &World,
    rng: &mut R,
    max_attempts: u32,
    margin: Option<i32>,
) -> Option<Cell> {
    if world.cols <= 0 || world.rows <= 0 {
        return None;
    }
    let margin = margin.unwrap_or(0).max(0);

    for _ in 0..max_attempts {
        let cell = Cell::new(rng.gen_range(0..world.cols), rng.gen_range(0..world.rows));

        let inside_margin = cell.x >= margin
            && cell.x < world.cols - margin
            && cell.y >= margin
            && cell.y < world.rows - margin;

        if inside_margin && !world.is_occupied(cell) {
            return Some(cell);
        }
    }

    None
}

/// Places one entity of `kind` using the attempt budget and margin from `config`.
pub fn spawn<R: Rng>(world: &mut World, rng: &mut R, kind: EntityKind, config: &GameConfig) -> Option<Cell> {
    let placed = if kind.is_obstacle() {
        try_place(world, rng, config.obstacle_attempts, Some(config.obstacle_margin))
    } else {
        try_place(world, rng, config.consumable_attempts, None)
    };

    let cell = match placed {
        Some(cell) => cell,
        None => {
            debug!("No free cell for {:?} this step", kind);
            return None;
        }
    };

    match kind {
        EntityKind::Food => world.food.push(cell),
        EntityKind::Coin => world.coins.push(cell),
        EntityKind::Rock => world.rocks.push(cell),
        EntityKind::Hole => world.holes.push(cell),
    }
    Some(cell)
}

/// Initial population for a fresh game.
pub fn seed<R: Rng>(world: &mut World, rng: &mut R, config: &GameConfig) {
    fill_to(world, rng, EntityKind::Rock, config.initial_rocks.min(config.rock_cap), config);
    fill_to(world, rng, EntityKind::Hole, config.initial_holes.min(config.hole_cap), config);
    top_up(world, rng, config);
}

/// Runs after every movement step: consumables back up to their targets,
/// obstacles occasionally grow towards their caps.
pub fn replenish<R: Rng>(world: &mut World, rng: &mut R, config: &GameConfig) {
    top_up(world, rng, config);

    if world.rocks.len() < config.rock_cap && rng.gen_bool(config.obstacle_chance.clamp(0.0, 1.0)) {
        spawn(world, rng, EntityKind::Rock, config);
    }
    if world.holes.len() < config.hole_cap && rng.gen_bool(config.obstacle_chance.clamp(0.0, 1.0)) {
        spawn(world, rng, EntityKind::Hole, config);
    }
}

fn top_up<R: Rng>(world: &mut World, rng: &mut R, config: &GameConfig) {
    fill_to(world, rng, EntityKind::Food, config.food_target, config);
    fill_to(world, rng, EntityKind::Coin, config.coin_target, config);
}

fn fill_to<R: Rng>(world: &mut World, rng: &mut R, kind: EntityKind, target: usize, config: &GameConfig) {
    while count(world, kind) < target {
        if spawn(world, rng, kind, config).is_none() {
            break;
        }
    }
}

fn count(world: &World, kind: EntityKind) -> usize {
    match kind {
        EntityKind::Food => world.food.len(),
        EntityKind::Coin => world.coins.len(),
        EntityKind::Rock => world.rocks.len(),
        EntityKind::Hole => world.holes.len(),
    }
}
