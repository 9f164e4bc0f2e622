use std::io;
use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use storefront::domain::ports::AdminNotifier;
use storefront::infrastructure::{DisabledNotifier, TelegramNotifier};
use storefront::{build_server, create_pool, run_migrations, AppState, Config};

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let pool = create_pool(&config.database_url, config.database_pool_size)
        .map_err(|e| startup_error("Failed to create database pool", e))?;
    run_migrations(&pool).map_err(|e| startup_error("Failed to run database migrations", e))?;

    let notifier: Arc<dyn AdminNotifier> = match &config.bot_token {
        Some(token) => Arc::new(
            TelegramNotifier::new(&config.telegram_api_url, token, config.notify_timeout)
                .map_err(|e| startup_error("Failed to build Telegram client", e))?,
        ),
        None => {
            log::warn!("BOT_TOKEN is not set; admin notifications are disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let state = web::Data::new(AppState::new(pool, notifier, config.api_secret.clone()));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
