//! Move legality for a single snake.
//!
//! The checks run in a fixed order and the first match wins: bounds, own
//! body, other living snakes, rocks, holes. A move that is both self- and
//! other-lethal is therefore always reported as self-inflicted.

use crate::world::World;
use shared::Cell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    OutOfBounds,
    OwnBody,
    /// Carries the id of the snake that was hit.
    OtherSnake(u32),
    Rock,
    Hole,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collision::OutOfBounds => write!(f, "left the arena"),
            Collision::OwnBody => write!(f, "ran into itself"),
            Collision::OtherSnake(_) => write!(f, "ran into another snake"),
            Collision::Rock => write!(f, "hit a rock"),
            Collision::Hole => write!(f, "fell into a hole"),
        }
    }
}

/// Decides whether moving `world.snakes[index]` onto `new_head` is lethal.
///
/// `grows` says whether the snake keeps its tail this step; when it does not,
/// the tail cell is about to be vacated and is not counted as a self hit.
pub fn check_move(world: &World, index: usize, new_head: Cell, grows: bool) -> Option<Collision> {
    let snake = &world.snakes[index];

    if !world.in_bounds(new_head) {
        return Some(Collision::OutOfBounds);
    }

    let checked_len = if grows {
        snake.body.len()
    } else {
        snake.body.len().saturating_sub(1)
    };
    if snake.body.iter().take(checked_len).any(|c| *c == new_head) {
        return Some(Collision::OwnBody);
    }

    if let Some(other) = world
        .snakes
        .iter()
        .enumerate()
        .find(|(i, other)| *i != index && other.is_alive() && other.occupies(new_head))
        .map(|(_, other)| other)
    {
        return Some(Collision::OtherSnake(other.id));
    }

    if world.rocks.contains(&new_head) {
        return Some(Collision::Rock);
    }

    if world.holes.contains(&new_head) {
        return Some(Collision::Hole);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Direction, Snake};

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

    fn world_with(snakes: Vec<Snake>) -> World {
        let mut world = World::new(10, 10);
        for snake in snakes {
            world.add_snake(snake);
        }
        world
    }

    #[test]
    fn test_free_move() {
        let world = world_with(vec![snake_at(1, &[(5, 5), (4, 5)])]);
        assert_eq!(check_move(&world, 0, Cell::new(6, 5), false), None);
    }

    #[test]
    fn test_each_border() {
        let world = world_with(vec![snake_at(1, &[(5, 5)])]);
        for (x, y) in [(-1, 5), (10, 5), (5, -1), (5, 10)] {
            assert_eq!(
                check_move(&world, 0, Cell::new(x, y), false),
                Some(Collision::OutOfBounds)
            );
        }
    }

    #[test]
    fn test_own_body() {
        let world = world_with(vec![snake_at(1, &[(5, 5), (5, 6), (6, 6), (6, 5), (6, 4)])]);
        assert_eq!(
            check_move(&world, 0, Cell::new(6, 5), false),
            Some(Collision::OwnBody)
        );
    }

    #[test]
    fn test_vacating_tail_is_safe_without_growth() {
        // Square loop: head at (5,5), tail at (5,4), moving up onto the tail.
        let world = world_with(vec![snake_at(1, &[(5, 5), (6, 5), (6, 4), (5, 4)])]);
        assert_eq!(check_move(&world, 0, Cell::new(5, 4), false), None);
        assert_eq!(
            check_move(&world, 0, Cell::new(5, 4), true),
            Some(Collision::OwnBody)
        );
    }

    #[test]
    fn test_reversing_into_neck() {
        let world = world_with(vec![snake_at(1, &[(5, 5), (4, 5), (3, 5)])]);
        assert_eq!(
            check_move(&world, 0, Cell::new(4, 5), false),
            Some(Collision::OwnBody)
        );
    }

    #[test]
    fn test_other_living_snake() {
        let world = world_with(vec![
            snake_at(1, &[(5, 5)]),
            snake_at(2, &[(6, 4), (6, 5), (6, 6)]),
        ]);
        assert_eq!(
            check_move(&world, 0, Cell::new(6, 5), false),
            Some(Collision::OtherSnake(2))
        );
        // The other snake's tail counts even though it may move later.
        assert_eq!(
            check_move(&world, 0, Cell::new(6, 6), false),
            Some(Collision::OtherSnake(2))
        );
    }

    #[test]
    fn test_dead_snake_is_harmless() {
        let mut dead = snake_at(2, &[(6, 5)]);
        dead.is_dead = true;
        let world = world_with(vec![snake_at(1, &[(5, 5)]), dead]);
        assert_eq!(check_move(&world, 0, Cell::new(6, 5), false), None);
    }

    #[test]
    fn test_rock_and_hole() {
        let mut world = world_with(vec![snake_at(1, &[(5, 5)])]);
        world.rocks.push(Cell::new(6, 5));
        world.holes.push(Cell::new(4, 5));

        assert_eq!(check_move(&world, 0, Cell::new(6, 5), false), Some(Collision::Rock));
        assert_eq!(check_move(&world, 0, Cell::new(4, 5), false), Some(Collision::Hole));
    }

    #[test]
    fn test_self_reported_before_other() {
        // Both snakes overlap on (4,5); the move hits own body first.
        let world = world_with(vec![
            snake_at(1, &[(5, 5), (4, 5), (3, 5)]),
            snake_at(2, &[(4, 5), (4, 6)]),
        ]);
        assert_eq!(
            check_move(&world, 0, Cell::new(4, 5), false),
            Some(Collision::OwnBody)
        );
    }

    #[test]
    fn test_other_snake_reported_before_rock() {
        let mut world = world_with(vec![snake_at(1, &[(5, 5)]), snake_at(2, &[(6, 5)])]);
        world.rocks.push(Cell::new(6, 5));
        assert_eq!(
            check_move(&world, 0, Cell::new(6, 5), false),
            Some(Collision::OtherSnake(2))
        );
    }

    #[test]
    fn test_rock_reported_before_hole() {
        let mut world = world_with(vec![snake_at(1, &[(5, 5)])]);
        world.rocks.push(Cell::new(6, 5));
        world.holes.push(Cell::new(6, 5));
        assert_eq!(check_move(&world, 0, Cell::new(6, 5), false), Some(Collision::Rock));
    }

    #[test]
    fn test_collision_display() {
        assert_eq!(Collision::Rock.to_string(), "hit a rock");
        assert_eq!(Collision::OtherSnake(3).to_string(), "ran into another snake");
    }
}
