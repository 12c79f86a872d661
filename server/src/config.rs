//! Gameplay tunables for a single server process.

use clap::ValueEnum;
use shared::{GRID_COLS, GRID_ROWS};

/// How snakes inside one movement step observe each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TickOrder {
    /// Snakes advance one at a time in registration order; a later snake sees
    /// where an earlier snake already moved (and whether it already died).
    Sequential,
    /// Every new head is checked against the world as it was before the step.
    /// Snakes whose new heads land on the same cell all die.
    Simultaneous,
}

/// When dead snakes are removed from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeadSnakePolicy {
    /// Dead bodies stay for spectators until the process exits.
    Retain,
    /// A start command removes every dead snake.
    PurgeOnStart,
    /// A disconnecting session's snakes are removed with it.
    PurgeOnDisconnect,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub cols: i32,
    pub rows: i32,
    /// A movement step runs on every Nth loop evaluation.
    pub speed_divisor: u32,
    pub food_target: usize,
    pub coin_target: usize,
    pub rock_cap: usize,
    pub hole_cap: usize,
    pub initial_rocks: usize,
    pub initial_holes: usize,
    /// Chance per movement step, per obstacle kind, of trying to add one.
    pub obstacle_chance: f64,
    /// Obstacles never land closer than this to the border.
    pub obstacle_margin: i32,
    pub consumable_attempts: u32,
    pub obstacle_attempts: u32,
    /// New snakes spawn at least this far from the border.
    pub spawn_margin: i32,
    pub tick_order: TickOrder,
    pub dead_snakes: DeadSnakePolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            speed_divisor: 6,
            food_target: 5,
            coin_target: 3,
            rock_cap: 12,
            hole_cap: 6,
            initial_rocks: 4,
            initial_holes: 2,
            obstacle_chance: 0.05,
            obstacle_margin: 2,
            consumable_attempts: 50,
            obstacle_attempts: 20,
            spawn_margin: 3,
            tick_order: TickOrder::Sequential,
            dead_snakes: DeadSnakePolicy::Retain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.cols, 45);
        assert_eq!(config.rows, 30);
        assert_eq!(config.consumable_attempts, 50);
        assert_eq!(config.obstacle_attempts, 20);
        assert!(config.speed_divisor >= 1);
        assert!(config.initial_rocks <= config.rock_cap);
        assert!(config.initial_holes <= config.hole_cap);
        assert_eq!(config.tick_order, TickOrder::Sequential);
        assert_eq!(config.dead_snakes, DeadSnakePolicy::Retain);
    }

    #[test]
    fn test_policy_names_parse() {
        assert_eq!(
            TickOrder::from_str("simultaneous", true),
            Ok(TickOrder::Simultaneous)
        );
        assert_eq!(
            DeadSnakePolicy::from_str("purge-on-start", true),
            Ok(DeadSnakePolicy::PurgeOnStart)
        );
        assert!(DeadSnakePolicy::from_str("sometimes", true).is_err());
    }
}
