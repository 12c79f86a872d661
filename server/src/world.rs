//! Canonical in-memory model of the grid and everything on it.

use shared::{Cell, Snake, Snapshot};

#[derive(Debug, Clone)]
pub struct World {
    pub cols: i32,
    pub rows: i32,
    /// Registration order; this is also the processing order of a movement step.
    pub snakes: Vec<Snake>,
    pub food: Vec<Cell>,
    /// May hold the same cell more than once when a dying snake drops its coins.
    pub coins: Vec<Cell>,
    pub rocks: Vec<Cell>,
    pub holes: Vec<Cell>,
    pub running: bool,
    pub elapsed_seconds: f64,
    pub total_coins: u32,
}

impl World {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self {
            cols,
            rows,
            snakes: Vec::new(),
            food: Vec::new(),
            coins: Vec::new(),
            rocks: Vec::new(),
            holes: Vec::new(),
            running: false,
            elapsed_seconds: 0.0,
            total_coins: 0,
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.in_bounds(self.cols, self.rows)
    }

    /// True if any consumable, obstacle or snake segment (dead or alive) sits on `cell`.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.food.contains(&cell)
            || self.coins.contains(&cell)
            || self.rocks.contains(&cell)
            || self.holes.contains(&cell)
            || self.snakes.iter().any(|snake| snake.occupies(cell))
    }

    /// Appends a snake. Its position in the list is its processing order for
    /// every later movement step.
    pub fn add_snake(&mut self, snake: Snake) {
        self.snakes.push(snake);
    }

    /// Finds the living snake owned by session `id`.
    ///
    /// Dead snakes with the same id may still be in the world; they are never
    /// returned.
    pub fn live_snake(&self, id: u32) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.id == id && s.is_alive())
    }

    /// Mutable variant of [`World::live_snake`].
    pub fn live_snake_mut(&mut self, id: u32) -> Option<&mut Snake> {
        self.snakes.iter_mut().find(|s| s.id == id && s.is_alive())
    }

    pub fn live_snake_count(&self) -> usize {
        self.snakes.iter().filter(|s| s.is_alive()).count()
    }

    /// Removes one food item at `cell`. Returns false if there was none.
    pub fn take_food(&mut self, cell: Cell) -> bool {
        take_one(&mut self.food, cell)
    }

    /// Removes one coin at `cell`. Returns false if there was none.
    pub fn take_coin(&mut self, cell: Cell) -> bool {
        take_one(&mut self.coins, cell)
    }

    /// Removes every dead snake and returns how many were removed.
    pub fn purge_dead_snakes(&mut self) -> usize {
        let before = self.snakes.len();
        self.snakes.retain(|s| s.is_alive());
        before - self.snakes.len()
    }

    /// Removes the dead snakes owned by session `id`, leaving a living one
    /// (if any) in place. Returns how many were removed.
    pub fn purge_dead_snakes_of(&mut self, id: u32) -> usize {
        let before = self.snakes.len();
        self.snakes.retain(|s| s.id != id || s.is_alive());
        before - self.snakes.len()
    }

    /// Copies the whole world into the form sent to clients.
    ///
    /// No deltas are kept, so every snapshot is complete on its own.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snakes: self.snakes.clone(),
            food: self.food.clone(),
            coins: self.coins.clone(),
            rocks: self.rocks.clone(),
            holes: self.holes.clone(),
            running: self.running,
            elapsed_seconds: self.elapsed_seconds,
            total_coins: self.total_coins,
        }
    }
}

fn take_one(cells: &mut Vec<Cell>, cell: Cell) -> bool {
    match cells.iter().position(|c| *c == cell) {
        Some(index) => {
            cells.swap_remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Direction;

    fn snake_at(id: u32, cells: &[(i32, i32)]) -> Snake {
        let mut snake = Snake::new(
            id,
            format!("snake {}", id),
            "#fff".to_string(),
            Cell::new(cells[0].0, cells[0].1),
            Direction::Right,
        );
        for &(x, y) in &cells[1..] {
            snake.body.push_back(Cell::new(x, y));
        }
        snake
    }

    #[test]
    fn test_world_creation() {
        let world = World::new(45, 30);
        assert_eq!((world.cols, world.rows), (45, 30));
        assert!(!world.running);
        assert!(world.snakes.is_empty());
        assert_eq!(world.total_coins, 0);
    }

    #[test]
    fn test_is_occupied() {
        let mut world = World::new(10, 10);
        world.food.push(Cell::new(1, 1));
        world.coins.push(Cell::new(2, 2));
        world.rocks.push(Cell::new(3, 3));
        world.holes.push(Cell::new(4, 4));
        world.add_snake(snake_at(1, &[(5, 5), (5, 6)]));

        for (x, y) in [(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (5, 6)] {
            assert!(world.is_occupied(Cell::new(x, y)), "({}, {})", x, y);
        }
        assert!(!world.is_occupied(Cell::new(0, 0)));
        assert!(!world.is_occupied(Cell::new(9, 9)));
    }

    #[test]
    fn test_dead_snake_still_occupies() {
        let mut world = World::new(10, 10);
        let mut snake = snake_at(1, &[(5, 5)]);
        snake.is_dead = true;
        world.add_snake(snake);
        assert!(world.is_occupied(Cell::new(5, 5)));
        assert!(world.live_snake(1).is_none());
    }

    #[test]
    fn test_live_snake_lookup_skips_dead_body() {
        let mut world = World::new(10, 10);
        let mut dead = snake_at(1, &[(1, 1)]);
        dead.is_dead = true;
        world.add_snake(dead);
        world.add_snake(snake_at(1, &[(6, 6)]));

        assert_eq!(world.live_snake(1).map(|s| s.head()), Some(Cell::new(6, 6)));
        assert_eq!(world.live_snake_count(), 1);
    }

    #[test]
    fn test_take_coin_removes_one_of_stack() {
        let mut world = World::new(10, 10);
        world.coins = vec![Cell::new(2, 2), Cell::new(2, 2), Cell::new(3, 3)];

        assert!(world.take_coin(Cell::new(2, 2)));
        assert_eq!(world.coins.len(), 2);
        assert_eq!(world.coins.iter().filter(|c| **c == Cell::new(2, 2)).count(), 1);
        assert!(!world.take_coin(Cell::new(7, 7)));
        assert!(!world.take_food(Cell::new(2, 2)));
    }

    #[test]
    fn test_purge_dead_snakes() {
        let mut world = World::new(10, 10);
        let mut dead1 = snake_at(1, &[(1, 1)]);
        dead1.is_dead = true;
        let mut dead2 = snake_at(2, &[(2, 2)]);
        dead2.is_dead = true;
        world.add_snake(dead1);
        world.add_snake(dead2);
        world.add_snake(snake_at(3, &[(3, 3)]));

        assert_eq!(world.purge_dead_snakes_of(1), 1);
        assert_eq!(world.snakes.len(), 2);
        assert_eq!(world.purge_dead_snakes(), 1);
        assert_eq!(world.snakes.len(), 1);
        assert_eq!(world.snakes[0].id, 3);
    }

    #[test]
    fn test_snapshot_copies_everything() {
        let mut world = World::new(10, 10);
        world.add_snake(snake_at(1, &[(5, 5)]));
        world.food.push(Cell::new(1, 1));
        world.running = true;
        world.elapsed_seconds = 3.0;
        world.total_coins = 2;

        let snapshot = world.snapshot();
        assert_eq!(snapshot.snakes.len(), 1);
        assert_eq!(snapshot.food, vec![Cell::new(1, 1)]);
        assert!(snapshot.running);
        assert_eq!(snapshot.total_coins, 2);
        assert_eq!(snapshot.elapsed_seconds, 3.0);
    }
}
