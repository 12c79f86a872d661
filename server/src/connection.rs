//! Turns inbound packets into world mutations and replies.
//!
//! All client packets go through [`ConnectionManager::handle_packet`], the
//! single dispatch point between the transport and the simulation core.

use crate::broadcaster::Broadcaster;
use crate::client_manager::{ClientManager, CLIENT_TIMEOUT};
use crate::game::{Death, GameState};
use log::{debug, info};
use shared::{Direction, Packet, PROTOCOL_VERSION};
use std::net::SocketAddr;

pub const WAITING_MESSAGE: &str = "Waiting for a player to start the game";

pub struct ConnectionManager {
    clients: ClientManager,
    broadcaster: Broadcaster,
}

impl ConnectionManager {
    pub fn new(max_clients: usize, broadcaster: Broadcaster) -> Self {
        Self {
            clients: ClientManager::new(max_clients),
            broadcaster,
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn session_for(&self, addr: SocketAddr) -> Option<u32> {
        self.clients.find_client_by_addr(addr)
    }

    pub fn handle_packet(&mut self, game: &mut GameState, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                self.on_connect_request(game, client_version, addr);
            }
            Packet::Heartbeat => {
                self.active_session(addr);
            }
            Packet::StartGame => {
                if self.active_session(addr).is_some() {
                    self.on_start(game);
                }
            }
            Packet::CreateSnake { display_name } => {
                if let Some(client_id) = self.active_session(addr) {
                    self.on_create_snake(game, client_id, &display_name);
                }
            }
            Packet::PlayerMove { direction } => {
                if let Some(client_id) = self.active_session(addr) {
                    self.on_move(game, client_id, direction);
                }
            }
            Packet::Disconnect => {
                if let Some(client_id) = self.session_for(addr) {
                    self.on_disconnect(game, client_id);
                }
            }
            // Server-to-client kinds never get past the receiver task.
            _ => {
                debug!("Ignoring server packet kind from {}", addr);
            }
        }
    }

    /// Looks up the session for `addr` and marks it active.
    fn active_session(&mut self, addr: SocketAddr) -> Option<u32> {
        let client_id = self.clients.find_client_by_addr(addr);
        match client_id {
            Some(id) => {
                self.clients.touch(id);
            }
            None => debug!("Packet from {} without a session", addr),
        }
        client_id
    }

    fn on_connect_request(&mut self, game: &mut GameState, client_version: u32, addr: SocketAddr) {
        info!(
            "Client connecting from {} (version: {})",
            addr, client_version
        );

        if client_version != PROTOCOL_VERSION {
            self.broadcaster.send(
                Packet::Disconnected {
                    reason: "Protocol version mismatch".to_string(),
                },
                addr,
            );
            return;
        }

        if let Some(existing_id) = self.clients.find_client_by_addr(addr) {
            info!("Replacing existing client {} from {}", existing_id, addr);
            self.on_disconnect(game, existing_id);
        }

        match self.clients.add_client(addr) {
            Some(client_id) => {
                self.broadcaster.send(Packet::Connected { client_id }, addr);
                self.on_connect(game, client_id);
            }
            None => {
                self.broadcaster.send(
                    Packet::Disconnected {
                        reason: "Server full".to_string(),
                    },
                    addr,
                );
            }
        }
    }

    /// A running game is sent in full; otherwise the session is told to wait.
    pub fn on_connect(&mut self, game: &GameState, client_id: u32) {
        let Some(addr) = self.clients.get_client(client_id).map(|c| c.addr) else {
            return;
        };

        if game.is_running() {
            self.broadcaster.send_state(&game.world, addr);
        } else {
            self.broadcaster.send(
                Packet::Waiting {
                    message: WAITING_MESSAGE.to_string(),
                },
                addr,
            );
        }
    }

    /// No guard against an already running game: a second start reseeds and
    /// resets the counters.
    pub fn on_start(&mut self, game: &mut GameState) {
        game.start();
        self.broadcaster
            .broadcast(Packet::GameStarted, self.clients.get_client_addrs());
    }

    pub fn on_create_snake(&mut self, game: &mut GameState, client_id: u32, display_name: &str) {
        let Some(snake) = game.create_snake(client_id, display_name) else {
            debug!("Client {} already owns a living snake", client_id);
            return;
        };

        self.broadcaster.broadcast(
            Packet::SnakeCreated {
                snake: snake.clone(),
                session_id: client_id,
            },
            self.clients.get_client_addrs(),
        );

        if let Some(client) = self.clients.get_client(client_id) {
            self.broadcaster.send(
                Packet::SnakeAssigned {
                    snake,
                    session_id: client_id,
                },
                client.addr,
            );
        }
    }

    pub fn on_move(&mut self, game: &mut GameState, client_id: u32, direction: Direction) {
        if !game.queue_direction(client_id, direction) {
            debug!("Ignoring move from client {} without a snake", client_id);
        }
    }

    pub fn on_disconnect(&mut self, game: &mut GameState, client_id: u32) {
        game.mark_disconnected(client_id);
        self.clients.remove_client(&client_id);
    }

    /// Disconnects every session that has been silent too long.
    pub fn check_timeouts(&mut self, game: &mut GameState) -> Vec<u32> {
        let timed_out = self.clients.check_timeouts(CLIENT_TIMEOUT);
        for client_id in &timed_out {
            game.mark_disconnected(*client_id);
        }
        timed_out
    }

    pub fn broadcast_game_state(&self, game: &GameState) {
        self.broadcaster
            .broadcast_snapshot(&game.world, self.clients.get_client_addrs());
    }

    pub fn announce_deaths(&self, deaths: &[Death]) {
        for death in deaths {
            self.broadcaster.broadcast(
                Packet::Notice {
                    message: format!("{} {}", death.display_name, death.cause),
                },
                self.clients.get_client_addrs(),
            );
        }
    }
}
