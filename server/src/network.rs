//! Server network layer handling UDP communications and game loop coordination

use crate::broadcaster::{Broadcaster, GameMessage};
use crate::connection::ConnectionManager;
use crate::game::GameState;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, MAX_DATAGRAM_SIZE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
}

/// Main server coordinating networking and game simulation
pub struct Server {
    socket: Arc<UdpSocket>,
    connections: ConnectionManager,
    game_state: GameState,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_rx: Option<mpsc::UnboundedReceiver<GameMessage>>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_clients: usize,
        game_state: GameState,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            connections: ConnectionManager::new(max_clients, Broadcaster::new(game_tx)),
            game_state,
            tick_duration,
            server_tx,
            server_rx,
            game_rx: Some(game_rx),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            // Large enough for any datagram, so nothing is ever truncated.
            let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        let Some(packet) = Self::decode_client_packet(&buffer[..len], addr) else {
                            continue;
                        };

                        if let Err(e) =
                            server_tx.send(ServerMessage::PacketReceived { packet, addr })
                        {
                            error!("Failed to send packet to main loop: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Decodes one inbound datagram. Undecodable data and server-to-client
    /// packet kinds are logged and dropped.
    fn decode_client_packet(data: &[u8], addr: SocketAddr) -> Option<Packet> {
        let packet = match deserialize::<Packet>(data) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Failed to deserialize packet from {}: {}", addr, e);
                return None;
            }
        };

        if !packet.is_client_packet() {
            warn!("Unexpected packet type from client at {}", addr);
            return None;
        }
        Some(packet)
    }

    /// Spawns task that processes outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let Some(mut game_rx) = self.game_rx.take() else {
            return;
        };

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet, recipients } => {
                        let data = match serialize(&packet) {
                            Ok(data) => data,
                            Err(e) => {
                                error!("Failed to encode broadcast packet: {}", e);
                                continue;
                            }
                        };

                        for addr in recipients {
                            if let Err(e) = socket.send_to(&data, addr).await {
                                error!("Failed to send to {}: {}", addr, e);
                            }
                        }
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    /// One loop evaluation: advance the game if it is running, then push the
    /// world to every session.
    fn run_tick(&mut self, dt: Duration) {
        if !self.game_state.is_running() {
            return;
        }

        let evaluation = self.game_state.evaluate(dt);
        if !evaluation.deaths.is_empty() {
            self.connections.announce_deaths(&evaluation.deaths);
        }
        self.connections.broadcast_game_state(&self.game_state);

        if evaluation.moved && self.game_state.tick % 60 == 0 && self.connections.client_count() > 0 {
            debug!(
                "Tick {}: {} clients, {} live snakes, {:.1}Hz",
                self.game_state.tick,
                self.connections.client_count(),
                self.game_state.world.live_snake_count(),
                1.0 / dt.as_secs_f64().max(f64::EPSILON)
            );
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut timeout_interval = interval(Duration::from_secs(1));
        let mut last_tick = Instant::now();

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.connections.handle_packet(&mut self.game_state, packet, addr);
                        },
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Handle server tick events
                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick);
                    last_tick = now;

                    self.run_tick(dt);
                },

                _ = timeout_interval.tick() => {
                    let timed_out = self.connections.check_timeouts(&mut self.game_state);
                    if !timed_out.is_empty() {
                        info!("Removed {} timed out clients", timed_out.len());
                    }
                },
            }
        }

        Ok(())
    }
}
