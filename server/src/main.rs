use clap::Parser;
use log::{error, info};
use server::config::ServerConfig;
use server::dictionary::{Dictionary, WordCycle, WordSource};
use server::engine::Engine;
use server::network::Server;
use shared::{DEFAULT_PORT, MAX_GUESSES};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Word list, one word per line
    dictionary: PathBuf,

    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Wrong guesses allowed per round
    #[arg(short = 'g', long, default_value_t = MAX_GUESSES)]
    max_guesses: u32,

    /// Seed for word selection, for reproducible games
    #[arg(long, conflicts_with = "sequential")]
    seed: Option<u64>,

    /// Serve words in file order instead of at random
    #[arg(long)]
    sequential: bool,
}

/// Loads the dictionary and starts the game server.
/// Startup failures end the process with a non-zero exit code.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let words: Box<dyn WordSource> = if args.sequential {
        Box::new(WordCycle::open(&args.dictionary).map_err(|e| {
            error!("{} ({})", e, args.dictionary.display());
            e
        })?)
    } else {
        Box::new(Dictionary::open(&args.dictionary, args.seed).map_err(|e| {
            error!("{} ({})", e, args.dictionary.display());
            e
        })?)
    };

    let config = ServerConfig::default().with_max_guesses(args.max_guesses);
    info!("Allowing {} wrong guesses per round", config.max_guesses);
    let engine = Engine::new(config, words);

    let address = SocketAddr::new(args.host, args.port);
    let mut server = Server::bind(address, engine).await.map_err(|e| {
        error!("Failed to bind {}: {}", address, e);
        e
    })?;

    // Handle shutdown gracefully
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
