use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

pub const GRID_COLS: i32 = 45;
pub const GRID_ROWS: i32 = 30;
pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_DISPLAY_NAME_LEN: usize = 20;

/// Largest UDP payload over IPv4. Every packet has to fit in one datagram.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Colors handed out to new snakes in round-robin order.
pub const SNAKE_COLORS: [&str; 8] = [
    "#4caf50", "#2196f3", "#ff9800", "#e91e63", "#9c27b0", "#00bcd4", "#ffeb3b", "#f44336",
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    Heartbeat,
    StartGame,
    CreateSnake {
        display_name: String,
    },
    PlayerMove {
        direction: Direction,
    },
    Disconnect,

    Connected {
        client_id: u32,
    },
    Waiting {
        message: String,
    },
    GameState {
        snapshot: Snapshot,
    },
    GameStarted,
    SnakeCreated {
        snake: Snake,
        session_id: u32,
    },
    SnakeAssigned {
        snake: Snake,
        session_id: u32,
    },
    GameUpdate {
        snapshot: Snapshot,
    },
    Notice {
        message: String,
    },
    Disconnected {
        reason: String,
    },
}

impl Packet {
    /// True for the packet kinds a client is allowed to send. Anything else
    /// arriving at the server is dropped before it reaches the game loop.
    pub fn is_client_packet(&self) -> bool {
        matches!(
            self,
            Packet::Connect { .. }
                | Packet::Heartbeat
                | Packet::StartGame
                | Packet::CreateSnake { .. }
                | Packet::PlayerMove { .. }
                | Packet::Disconnect
        )
    }
}

/// A single grid cell. `x` grows to the right, `y` grows downwards.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(&self, direction: Direction) -> Cell {
        let (dx, dy) = direction.vector();
        Cell::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(&self, cols: i32, rows: i32) -> bool {
        self.x >= 0 && self.x < cols && self.y >= 0 && self.y < rows
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn vector(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snake {
    /// Same value as the owning session id.
    pub id: u32,
    /// Head first.
    pub body: VecDeque<Cell>,
    pub direction: Direction,
    pub next_direction: Direction,
    pub color: String,
    pub food_eaten: u32,
    pub coins_collected: u32,
    pub is_dead: bool,
    pub display_name: String,
}

impl Snake {
    pub fn new(id: u32, display_name: String, color: String, spawn: Cell, direction: Direction) -> Self {
        let mut body = VecDeque::new();
        body.push_back(spawn);

        Self {
            id,
            body,
            direction,
            next_direction: direction,
            color,
            food_eaten: 0,
            coins_collected: 0,
            is_dead: false,
            display_name,
        }
    }

    pub fn head(&self) -> Cell {
        // body is never empty: constructed with one cell and only the tail is ever popped
        // after a new head has been pushed
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }
}

/// Full copy of the world as sent to clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub snakes: Vec<Snake>,
    pub food: Vec<Cell>,
    pub coins: Vec<Cell>,
    pub rocks: Vec<Cell>,
    pub holes: Vec<Cell>,
    pub running: bool,
    pub elapsed_seconds: f64,
    pub total_coins: u32,
}

/// Trims and truncates a requested display name, falling back to `Player <id>`.
pub fn sanitize_display_name(raw: &str, session_id: u32) -> String {
    let trimmed: String = raw.trim().chars().take(MAX_DISPLAY_NAME_LEN).collect();
    let trimmed = trimmed.trim_end().to_string();

    if trimmed.is_empty() {
        format!("Player {}", session_id)
    } else {
        trimmed
    }
}
