//! # Snake Arena Server Library
//!
//! Authoritative server for a multiplayer grid snake game. It owns the one
//! shared world, advances it at a fixed cadence, decides every collision, and
//! broadcasts the full world to all connected clients after every loop
//! evaluation. Clients only send intents (start, create snake, change
//! direction) and render whatever snapshot they receive.
//!
//! ## Architecture
//!
//! ### Single-Threaded Game Loop
//! A receiver task and a sender task move datagrams between the UDP socket
//! and channels. Everything else runs on one loop that owns the
//! [`game::GameState`] and the [`connection::ConnectionManager`] outright and
//! `select!`s over inbound packets, the tick interval and a timeout sweep.
//! Handlers run to completion, so the world needs no locks.
//!
//! ### Loop Evaluations and Movement Steps
//! The tick interval fires roughly 60 times per second. Every evaluation
//! updates the elapsed time and broadcasts a snapshot; only every Nth
//! evaluation (the speed divisor) is a movement step in which snakes advance
//! and collisions are resolved.
//!
//! ## Module Organization
//!
//! - `world`: the canonical grid, snakes, consumables and obstacles
//! - `spawner`: bounded-attempt random placement
//! - `collision`: ordered legality checks for one move
//! - `game`: movement steps, growth, death, same-tick ordering policies
//! - `client_manager`: session registry and timeouts
//! - `connection`: typed packet dispatch (connect, start, create, move, disconnect)
//! - `broadcaster`: outbound packet queue and snapshot broadcast
//! - `network`: UDP tasks and the fixed-cadence loop
//! - `config`: gameplay tunables and policies
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::game::GameState;
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let game = GameState::new(GameConfig::default());
//!     let mut server = Server::new(
//!         "127.0.0.1:8080",
//!         Duration::from_micros(16_667), // ~60 evaluations per second
//!         32,
//!         game,
//!     )
//!     .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod broadcaster;
pub mod client_manager;
pub mod collision;
pub mod config;
pub mod connection;
pub mod game;
pub mod network;
pub mod spawner;
pub mod world;
