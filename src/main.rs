mod analysis;
mod api;
mod app_service;
mod app_state;
mod config;
mod error;
mod storage;
mod submission;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use log::info;

use crate::app_state::AppState;
use crate::config::Config;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("sqlx", log::LevelFilter::Warn)
        .filter_module("sea_orm", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = Config::load()?;
    error::expose_error_details(!config.is_production());
    info!(
        "Starting recruitd ({:?}) on port {}",
        config.environment, config.port
    );

    let db = storage::establish_connection(&config.database)
        .await
        .with_context(|| format!("cannot open database {}", config.database.url))?;

    if let Some(admin) = &config.bootstrap_admin {
        app_service::bootstrap_admin(&db, admin)
            .await
            .context("failed to create bootstrap admin")?;
    }

    api::serve(AppState::new(db, config)).await
}
