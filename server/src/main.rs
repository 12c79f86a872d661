use clap::Parser;
use log::info;
use server::config::{DeadSnakePolicy, GameConfig, TickOrder};
use server::game::GameState;
use server::network::Server;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Loop evaluations per second
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Snakes advance on every Nth evaluation
    #[arg(short, long, default_value = "6")]
    speed_divisor: u32,

    /// Maximum number of concurrent sessions
    #[arg(short, long, default_value = "32")]
    max_clients: usize,

    /// How snakes observe each other within one movement step
    #[arg(long, value_enum, default_value = "sequential")]
    tick_order: TickOrder,

    /// When dead snakes are removed from the world
    #[arg(long, value_enum, default_value = "retain")]
    dead_snakes: DeadSnakePolicy,

    /// Seed for entity placement, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = GameConfig {
        speed_divisor: args.speed_divisor.max(1),
        tick_order: args.tick_order,
        dead_snakes: args.dead_snakes,
        ..GameConfig::default()
    };
    let tick_duration = Duration::from_secs_f64(1.0 / f64::from(args.tick_rate.max(1)));

    info!(
        "Starting server: {} Hz, speed divisor {}, {:?} tick order, {:?} dead snakes",
        args.tick_rate, config.speed_divisor, config.tick_order, config.dead_snakes
    );

    let game = match args.seed {
        Some(seed) => GameState::with_seed(config, seed),
        None => GameState::new(config),
    };

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, tick_duration, args.max_clients, game).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
