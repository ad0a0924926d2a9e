pub mod config;
pub mod db;
pub mod error;
pub mod logic;
mod packages;
pub mod routes;

use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

// Read the settings, open the database and serve until the process is stopped.
pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _guard = init_logging(&config);

    let db = db::connect(&config.database_url).await?;
    if let Some(seed) = &config.admin {
        if let Some(admin) = db::bootstrap_admin(&db, &seed.name, &seed.email, seed.token.as_deref()).await? {
            info!("admin token for {}: {}", admin.email, admin.api_token);
        }
    }

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, routes::router(db)).await?;

    Ok(())
}

// Log to stderr, or to daily files when a log directory is set. The guard must live as long as the program.
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "league-manager.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
