use dotenv::dotenv;
use tracing::{error, info, warn};

use kabale_market::app::app::App;
use kabale_market::config::AppConfig;
use kabale_market::util::logger::Logger;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file before the logger reads RUST_LOG
    let dotenv_result = dotenv();

    let _logger = match Logger::new() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e}");
            std::process::exit(1);
        }
    };

    info!("🚀 Starting Kabale Market");
    match dotenv_result {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid application configuration: {e}");
            std::process::exit(1);
        }
    };

    let app = match App::new(config).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to start: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = app.start().await {
        error!("Server stopped with an error: {e}");
        std::process::exit(1);
    }
}
