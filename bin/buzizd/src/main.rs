//! `buzizd` — the Buziz server binary.
//!
//! Usage:
//!   buzizd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/buziz/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod config;
mod kv_api;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use buziz_core::Module;

use auth_middleware::TokenState;
use config::ServerConfig;

/// Buziz server.
#[derive(Parser, Debug)]
#[command(name = "buzizd", about = "Buziz server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    config::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = buziz_core::ServiceConfig {
        data_dir: Some(data_dir.clone()),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    // One embedded store, shared by all modules.
    let kv: Arc<dyn buziz_kv::KVStore> = Arc::new(
        buziz_kv::RedbStore::open(&core_config.resolve_db_path())
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {e}"))?,
    );

    let office_module = buziz_office::OfficeModule::new(Arc::clone(&kv));
    info!("Office module initialized");

    let timeclock_module = buziz_timeclock::TimeclockModule::new(Arc::clone(&kv));
    info!("Timeclock module initialized");

    let records_module = buziz_records::RecordsModule::new(Arc::clone(&kv));
    info!("Records module initialized");

    let schedule_module = buziz_schedule::ScheduleModule::new(Arc::clone(&kv));
    info!("Schedule module initialized");

    // Keep the forward shift horizon covered.
    let worker_cancel = buziz_schedule::worker::start(
        Arc::clone(schedule_module.service()),
        server_config.schedule.materialize_interval_secs,
    );

    let module_routes = vec![
        (office_module.name(), office_module.routes()),
        (timeclock_module.name(), timeclock_module.routes()),
        (records_module.name(), records_module.routes()),
        (schedule_module.name(), schedule_module.routes()),
    ];

    let token = Arc::new(TokenState {
        token: server_config.api.token.clone(),
    });

    let app = routes::build_router(Arc::clone(&kv), token, module_routes);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Buziz server listening on {}", cli.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker_cancel.cancel();
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
}
