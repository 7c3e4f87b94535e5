use snake::display::StatusDisplay;
use snake::error::SnakeError;
use snake::logger::initialize as LoggerInitialize;

use game_core::balance::{RpcBalanceSource, refresh_balance};
use game_core::codec::MessageCodec;
use game_core::config::{ClientConfig, default_config_dir, default_data_dir, load_dotenv};
use game_core::engine::ProtocolEngine;
use game_core::session_store::FileSessionStore;
use game_core::signer::CommandSigner;
use game_core::transport::WebSocketConnector;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::time::Duration;

use log::{info, warn};
use tokio::signal::ctrl_c;
use tokio::time::timeout;

const LOG_DIR_NAME: &str = "logs";

/// How long to wait for the server to acknowledge a close after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), SnakeError> {
    let dotenv_path = load_dotenv();

    let config_dir = default_config_dir().map_err(|e| SnakeError::Config {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;
    let mut config = ClientConfig::load(&config_dir).map_err(|e| SnakeError::Config {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;
    config
        .apply_env_overrides()
        .map_err(|e| SnakeError::Config {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let log_dir = default_data_dir()
        .map_err(|e| SnakeError::Config {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?
        .join(LOG_DIR_NAME);

    create_dir_all(&log_dir).map_err(|e| SnakeError::Snake {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("Snake client starting");
    info!("Log directory: {}", log_dir.display());
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    let codec = MessageCodec::with_default_schema().map_err(|e| SnakeError::Core {
        message: format!("Failed to load message schema: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let session_dir = config.session_dir().map_err(|e| SnakeError::Config {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;
    info!("Session directory: {}", session_dir.display());

    let store = FileSessionStore::new(session_dir);
    let signer = CommandSigner::new(config.signer.program.clone(), config.signer.args.clone());
    info!("Wallet helper: {}", signer.program());
    let mut engine = ProtocolEngine::new(codec, store, signer);
    let display = StatusDisplay::attach(engine.state());

    let contract = config.token_contract().map_err(|e| SnakeError::Config {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Wallet bootstrap; a challenge asks again if this fails
    match engine.request_wallet().await {
        Ok(wallet) => match contract {
            Some(contract) => {
                match RpcBalanceSource::new(&config.balance.rpc_url, contract) {
                    Ok(source) => {
                        if let Err(e) = refresh_balance(&source, &wallet, engine.state()).await {
                            warn!("Balance lookup failed: {e}");
                        }
                    }
                    Err(e) => warn!("Balance lookup unavailable: {e}"),
                }
            }
            None => info!("No token contract configured, skipping balance lookup"),
        },
        Err(e) => warn!("Wallet not available yet: {e}"),
    }

    let url = config.server_url().map_err(|e| SnakeError::Config {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    engine
        .connect(&WebSocketConnector::new(), &url)
        .await
        .map_err(|e| SnakeError::Core {
            message: format!("Failed to connect to {url}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let interrupted = tokio::select! {
        result = engine.run() => {
            result.map_err(|e| SnakeError::Core {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
            false
        }
        signal = ctrl_c() => match signal {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to listen for Ctrl-C, running until the server closes: {e}");
                engine.run().await.map_err(|e| SnakeError::Core {
                    message: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?;
                false
            }
        }
    };

    if interrupted {
        info!("Interrupted, closing connection");
        engine.close().await;
        if timeout(SHUTDOWN_GRACE, engine.run()).await.is_err() {
            warn!("Server did not acknowledge close within {SHUTDOWN_GRACE:?}");
        }
    }

    display.detach();
    info!("Snake client stopped ({})", engine.connection_state());
    Ok(())
}
