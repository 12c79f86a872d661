//! Outbound packet queue between the game loop and the network sender task.

use crate::world::World;
use log::{debug, error};
use shared::{Packet, Snapshot, MAX_DATAGRAM_SIZE};
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Room left in a datagram for the packet tag around a snapshot.
const PACKET_HEADROOM: usize = 64;

/// Messages sent from game loop to network tasks
#[derive(Debug)]
pub enum GameMessage {
    SendPacket {
        packet: Packet,
        addr: SocketAddr,
    },
    /// Encoded once and sent to every recipient.
    BroadcastPacket {
        packet: Packet,
        recipients: Vec<SocketAddr>,
    },
}

/// Queues unicast and broadcast packets for the sender task.
#[derive(Clone)]
pub struct Broadcaster {
    game_tx: mpsc::UnboundedSender<GameMessage>,
}

impl Broadcaster {
    pub fn new(game_tx: mpsc::UnboundedSender<GameMessage>) -> Self {
        Self { game_tx }
    }

    pub fn send(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    pub fn broadcast(&self, packet: Packet, recipients: Vec<SocketAddr>) {
        if recipients.is_empty() {
            return;
        }

        if let Err(e) = self
            .game_tx
            .send(GameMessage::BroadcastPacket { packet, recipients })
        {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    /// Sends the whole world to every recipient. No deltas.
    pub fn broadcast_snapshot(&self, world: &World, recipients: Vec<SocketAddr>) {
        if recipients.is_empty() {
            return;
        }

        self.broadcast(
            Packet::GameUpdate {
                snapshot: fit_to_datagram(world.snapshot()),
            },
            recipients,
        );
    }

    /// Sends the whole world to one session that just joined a running game.
    pub fn send_state(&self, world: &World, addr: SocketAddr) {
        self.send(
            Packet::GameState {
                snapshot: fit_to_datagram(world.snapshot()),
            },
            addr,
        );
    }
}

/// Leaves the oldest dead snakes out of `snapshot` until it encodes into a
/// single datagram.
///
/// Retained dead bodies are the only part of the world that grows without
/// bound. Living snakes, consumables and obstacles are always kept, and they
/// fit on their own because living snakes never share a cell.
pub fn fit_to_datagram(mut snapshot: Snapshot) -> Snapshot {
    let budget = (MAX_DATAGRAM_SIZE - PACKET_HEADROOM) as u64;
    let mut size = match bincode::serialized_size(&snapshot) {
        Ok(size) => size,
        Err(e) => {
            error!("Failed to measure snapshot: {}", e);
            return snapshot;
        }
    };

    let mut dropped = 0;
    while size > budget {
        let Some(index) = snapshot.snakes.iter().position(|s| s.is_dead) else {
            break;
        };
        let removed = snapshot.snakes.remove(index);
        size = size.saturating_sub(bincode::serialized_size(&removed).unwrap_or(0));
        dropped += 1;
    }

    if dropped > 0 {
        debug!(
            "Left {} dead snakes out of an oversized snapshot ({} bytes)",
            dropped, size
        );
    }
    snapshot
}
