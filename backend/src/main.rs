use anyhow::Result;
use std::sync::Arc;
use subdesk_backend::axum_http::http_serve;
use subdesk_backend::config::config_loader;
use subdesk_core::infra::db::postgres::postgres_connection::{self, PoolOptions};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    subdesk_core::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        &PoolOptions {
            max_size: dotenvy_env.database.max_connections,
            disable_prepared_statements: dotenvy_env.database.disable_prepared_statements,
        },
    )?;
    info!("Postgres connection has been established");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(postgres_pool)).await?;

    Ok(())
}
