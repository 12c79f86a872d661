use crate::collision::{check_move, Collision};
use crate::config::{DeadSnakePolicy, GameConfig, TickOrder};
use crate::spawner;
use crate::world::World;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{sanitize_display_name, Cell, Direction, Snake, SNAKE_COLORS};
use std::time::Duration;

/// A snake that died during a movement step.
#[derive(Debug, Clone, PartialEq)]
pub struct Death {
    pub snake_id: u32,
    pub display_name: String,
    pub cause: Collision,
    /// Head position at the moment of death; dropped coins land here.
    pub cell: Cell,
    pub coins_dropped: u32,
}

/// Result of one loop evaluation.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Whether this evaluation was a movement step.
    pub moved: bool,
    pub deaths: Vec<Death>,
}

/// The authoritative game: the world plus everything needed to advance it.
///
/// Owned by the server loop and lent to the connection layer by mutable
/// reference.
pub struct GameState {
    /// Movement steps since the last start.
    pub tick: u32,
    pub world: World,
    config: GameConfig,
    rng: StdRng,
    evaluations: u64,
    next_color: usize,
}

impl GameState {
    /// Creates an idle game with an entropy-seeded RNG.
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates an idle game whose spawns and snake placement are reproducible
    /// for a given `seed`.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            tick: 0,
            world: World::new(config.cols, config.rows),
            config,
            rng,
            evaluations: 0,
            next_color: 0,
        }
    }

    /// True between the first start command and process exit.
    pub fn is_running(&self) -> bool {
        self.world.running
    }

    /// Starts (or restarts) a game. Live snakes are kept where they are.
    ///
    /// Elapsed time, the coin total and the step counter are reset, then the
    /// initial obstacles and consumables are placed. Existing entities stay.
    pub fn start(&mut self) {
        if self.config.dead_snakes == DeadSnakePolicy::PurgeOnStart {
            let purged = self.world.purge_dead_snakes();
            if purged > 0 {
                info!("Purged {} dead snakes", purged);
            }
        }

        self.world.running = true;
        self.world.elapsed_seconds = 0.0;
        self.world.total_coins = 0;
        self.evaluations = 0;
        self.tick = 0;

        spawner::seed(&mut self.world, &mut self.rng, &self.config);

        info!(
            "Game started: {} food, {} coins, {} rocks, {} holes",
            self.world.food.len(),
            self.world.coins.len(),
            self.world.rocks.len(),
            self.world.holes.len()
        );
    }

    /// Registers a new snake for `session_id`. Returns None if the session
    /// already owns a living snake.
    pub fn create_snake(&mut self, session_id: u32, display_name: &str) -> Option<Snake> {
        if self.world.live_snake(session_id).is_some() {
            return None;
        }

        let color = SNAKE_COLORS[self.next_color % SNAKE_COLORS.len()].to_string();
        self.next_color += 1;

        let spawn = self.random_spawn_cell();
        let snake = Snake::new(
            session_id,
            sanitize_display_name(display_name, session_id),
            color,
            spawn,
            Direction::Right,
        );

        info!(
            "Created snake for session {} ({}) at {}",
            session_id, snake.display_name, spawn
        );
        self.world.add_snake(snake.clone());
        Some(snake)
    }

    // Not checked against other entities.
    fn random_spawn_cell(&mut self) -> Cell {
        let (cols, rows) = (self.world.cols.max(1), self.world.rows.max(1));
        let margin = self.config.spawn_margin.max(0);

        let (min_x, max_x) = if cols > 2 * margin { (margin, cols - margin) } else { (0, cols) };
        let (min_y, max_y) = if rows > 2 * margin { (margin, rows - margin) } else { (0, rows) };

        Cell::new(
            self.rng.gen_range(min_x..max_x),
            self.rng.gen_range(min_y..max_y),
        )
    }

    /// Latches a direction for the next movement step. `direction` itself is
    /// left alone so an in-flight step is not affected.
    pub fn queue_direction(&mut self, session_id: u32, direction: Direction) -> bool {
        match self.world.live_snake_mut(session_id) {
            Some(snake) => {
                snake.next_direction = direction;
                true
            }
            None => false,
        }
    }

    /// Marks the session's snake dead, body left in place. Collected coins are
    /// not dropped. Returns false if the session had no living snake.
    pub fn mark_disconnected(&mut self, session_id: u32) -> bool {
        let killed = match self.world.live_snake_mut(session_id) {
            Some(snake) => {
                snake.is_dead = true;
                true
            }
            None => false,
        };

        if self.config.dead_snakes == DeadSnakePolicy::PurgeOnDisconnect {
            self.world.purge_dead_snakes_of(session_id);
        }

        killed
    }

    /// One fixed-cadence loop evaluation. Only every `speed_divisor`th
    /// evaluation advances the snakes.
    pub fn evaluate(&mut self, dt: Duration) -> Evaluation {
        if !self.world.running {
            return Evaluation::default();
        }

        self.world.elapsed_seconds += dt.as_secs_f64();
        self.evaluations += 1;

        if self.evaluations % u64::from(self.config.speed_divisor.max(1)) != 0 {
            return Evaluation::default();
        }

        Evaluation {
            moved: true,
            deaths: self.step(),
        }
    }

    /// Advances every living snake by one cell, then replenishes the world.
    ///
    /// Returns the snakes that died in this step in processing order. How
    /// snakes see each other within the step depends on [`TickOrder`].
    pub fn step(&mut self) -> Vec<Death> {
        let deaths = match self.config.tick_order {
            TickOrder::Sequential => self.step_sequential(),
            TickOrder::Simultaneous => self.step_simultaneous(),
        };

        spawner::replenish(&mut self.world, &mut self.rng, &self.config);
        self.tick += 1;

        if !deaths.is_empty() {
            debug!("Tick {}: {} deaths", self.tick, deaths.len());
        }
        deaths
    }

    fn step_sequential(&mut self) -> Vec<Death> {
        let mut deaths = Vec::new();

        for index in 0..self.world.snakes.len() {
            if self.world.snakes[index].is_dead {
                continue;
            }

            let new_head = self.commit_direction(index);
            let grows = self.world.food.contains(&new_head);

            match check_move(&self.world, index, new_head, grows) {
                Some(cause) => deaths.push(self.kill(index, cause)),
                None => self.advance(index, new_head),
            }
        }

        deaths
    }

    fn step_simultaneous(&mut self) -> Vec<Death> {
        let live: Vec<usize> = (0..self.world.snakes.len())
            .filter(|&i| self.world.snakes[i].is_alive())
            .collect();
        let moves: Vec<(usize, Cell)> = live
            .into_iter()
            .map(|index| (index, self.commit_direction(index)))
            .collect();

        let before = self.world.clone();
        let verdicts: Vec<Option<Collision>> = moves
            .iter()
            .map(|&(index, new_head)| {
                let grows = before.food.contains(&new_head);
                let collision = check_move(&before, index, new_head, grows);

                // Head-on ranks with the other-snake check, ahead of rocks and holes.
                match collision {
                    None | Some(Collision::Rock) | Some(Collision::Hole) => moves
                        .iter()
                        .find(|&&(other, other_head)| other != index && other_head == new_head)
                        .map(|&(other, _)| Collision::OtherSnake(before.snakes[other].id))
                        .or(collision),
                    _ => collision,
                }
            })
            .collect();

        let mut deaths = Vec::new();
        for (&(index, new_head), verdict) in moves.iter().zip(verdicts) {
            match verdict {
                Some(cause) => deaths.push(self.kill(index, cause)),
                None => self.advance(index, new_head),
            }
        }
        deaths
    }

    fn commit_direction(&mut self, index: usize) -> Cell {
        let snake = &mut self.world.snakes[index];
        snake.direction = snake.next_direction;
        snake.head().step(snake.direction)
    }

    fn advance(&mut self, index: usize, new_head: Cell) {
        self.world.snakes[index].body.push_front(new_head);

        if self.world.take_food(new_head) {
            self.world.snakes[index].food_eaten += 1;
        } else if self.world.take_coin(new_head) {
            let snake = &mut self.world.snakes[index];
            snake.coins_collected += 1;
            snake.body.pop_back();
            self.world.total_coins += 1;
        } else {
            self.world.snakes[index].body.pop_back();
        }
    }

    fn kill(&mut self, index: usize, cause: Collision) -> Death {
        let snake = &mut self.world.snakes[index];
        snake.is_dead = true;
        let cell = snake.head();
        let coins_dropped = std::mem::take(&mut snake.coins_collected);
        let snake_id = snake.id;
        let display_name = snake.display_name.clone();

        for _ in 0..coins_dropped {
            self.world.coins.push(cell);
        }

        info!(
            "Snake {} ({}) {} at {}, dropped {} coins",
            snake_id, display_name, cause, cell, coins_dropped
        );

        Death {
            snake_id,
            display_name,
            cause,
            cell,
            coins_dropped,
        }
    }
}
