use std::path::PathBuf;

use dotenv::dotenv;
use poolcare_backend::app::app::App;
use poolcare_backend::util::logger::Logger;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Load environment variables before anything reads them
    let dotenv_result = dotenv();

    let log_dir = PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
    let _logger = match Logger::new(&log_dir) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting pool care backend");
    match dotenv_result {
        Ok(_) => info!("Loaded .env file"),
        Err(e) => warn!("Failed to load .env file: {} (using system env vars)", e),
    }

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to start application: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = app.start().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
