use ctfbot::game::Game;
use ctfbot::infra::{DefaultObserver, GameConnection, ReplayFile};
use dotenv::dotenv;
use std::env;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_PLAYER_NAME: &str = "razor1911";

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ctfbot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let host =
        env::var("CTF_HOST").expect("CTF_HOST environment variable is required, e.g. localhost:8000");
    let player_name =
        env::var("CTF_PLAYER_NAME").unwrap_or_else(|_| DEFAULT_PLAYER_NAME.to_string());
    let replays_folder = env::var("CTF_REPLAYS_FOLDER").ok();

    let replay_file = replays_folder.as_deref().and_then(|folder| {
        ReplayFile::new(folder, &player_name)
            .inspect(|replay| tracing::info!("Recording replay to {}", replay.path().display()))
            .inspect_err(|err| tracing::warn!("Replay recording disabled: {}", err))
            .ok()
    });

    tracing::info!("Connecting to {} as {}", host, player_name);
    let connection = GameConnection::new(&host, replay_file).await?;
    let mut game = Game::new(connection, DefaultObserver, player_name);
    game.run().await?;

    Ok(())
}
