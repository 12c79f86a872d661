//! Headless bot that joins a running server, optionally starts the game,
//! creates a snake and wanders around, logging what it sees.

use bincode::{deserialize, serialize};
use clap::Parser;
use log::{info, warn};
use rand::seq::SliceRandom;
use shared::{Direction, Packet, MAX_DATAGRAM_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Display name for the bot's snake
    #[arg(short, long, default_value = "bot")]
    name: String,

    /// Send a start command after connecting
    #[arg(long)]
    start: bool,

    /// How long to play, in seconds
    #[arg(short, long, default_value = "30")]
    duration: u64,
}

async fn send(socket: &UdpSocket, packet: &Packet, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let data = serialize(packet)?;
    socket.send_to(&data, addr).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    let server_addr = args.server.parse::<SocketAddr>()?;
    info!("Client socket bound to {}", socket.local_addr()?);

    send(
        &socket,
        &Packet::Connect {
            client_version: PROTOCOL_VERSION,
        },
        server_addr,
    )
    .await?;

    if args.start {
        send(&socket, &Packet::StartGame, server_addr).await?;
    }
    send(
        &socket,
        &Packet::CreateSnake {
            display_name: args.name.clone(),
        },
        server_addr,
    )
    .await?;

    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut heartbeat = interval(Duration::from_secs(1));
    let mut steer = interval(Duration::from_millis(500));
    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let mut my_id = None;
    let mut updates: u64 = 0;

    while Instant::now() < deadline {
        tokio::select! {
            received = socket.recv_from(&mut buf) => {
                let (len, _) = received?;
                match deserialize::<Packet>(&buf[..len]) {
                    Ok(Packet::Connected { client_id }) => {
                        info!("Connection accepted with client ID: {}", client_id);
                    }
                    Ok(Packet::Waiting { message }) => info!("{}", message),
                    Ok(Packet::GameStarted) => info!("Game started"),
                    Ok(Packet::SnakeAssigned { snake, session_id }) => {
                        info!("Assigned snake {} at {}", snake.display_name, snake.head());
                        my_id = Some(session_id);
                    }
                    Ok(Packet::Notice { message }) => info!("Notice: {}", message),
                    Ok(Packet::Disconnected { reason }) => {
                        warn!("Disconnected by server: {}", reason);
                        return Ok(());
                    }
                    Ok(Packet::GameState { snapshot }) | Ok(Packet::GameUpdate { snapshot }) => {
                        updates += 1;
                        if updates % 60 == 0 {
                            let mine = my_id.and_then(|id| snapshot.snakes.iter().find(|s| s.id == id && !s.is_dead));
                            info!(
                                "t={:.1}s snakes={} food={} coins={} total_coins={} my_length={}",
                                snapshot.elapsed_seconds,
                                snapshot.snakes.len(),
                                snapshot.food.len(),
                                snapshot.coins.len(),
                                snapshot.total_coins,
                                mine.map(|s| s.len()).unwrap_or(0)
                            );
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Failed to decode packet: {}", e),
                }
            }
            _ = heartbeat.tick() => {
                send(&socket, &Packet::Heartbeat, server_addr).await?;
            }
            _ = steer.tick() => {
                let direction = *Direction::ALL
                    .choose(&mut rand::thread_rng())
                    .unwrap_or(&Direction::Right);
                send(&socket, &Packet::PlayerMove { direction }, server_addr).await?;
            }
        }
    }

    send(&socket, &Packet::Disconnect, server_addr).await?;
    info!("Received {} updates, disconnecting", updates);
    Ok(())
}
