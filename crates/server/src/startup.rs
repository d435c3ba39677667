use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;
use service::nights::{NightService, SeaOrmNightRepository, WeekPolicy};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {raw}: {e}")))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received, draining connections");
    }
}

/// Public entry: migrate, build the app and serve until Ctrl+C.
/// Config loading and logging setup belong to the caller.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&cfg.tracker.frontend_dir).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Runtime(format!("migrations failed: {e}")))?;

    let repo = Arc::new(SeaOrmNightRepository::new(db));
    let week = WeekPolicy::new(cfg.tracker.week_starts_on, cfg.tracker.week_lead_hours);
    let state = ServerState::new(NightService::new(repo, week));

    let app: Router = routes::build_router(state, &cfg.tracker.frontend_dir, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, week_starts_on = ?week.starts_on, frontend = %cfg.tracker.frontend_dir, "starting sleep tracker");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_uses_the_config_it_is_given() {
        let file = std::env::temp_dir().join(format!("sleep-tracker-startup-{}", std::process::id()));
        tokio::fs::write(&file, b"x").await.unwrap();
        let mut cfg = AppConfig::default();
        cfg.tracker.frontend_dir = file.to_str().unwrap().to_string();
        // fails on the front-end check, before any database work
        let res = run(cfg).await;
        let _ = tokio::fs::remove_file(&file).await;
        assert!(res.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn bind_addr_comes_from_config() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "127.0.0.1".into();
        cfg.server.port = 5001;
        assert_eq!(bind_addr(&cfg).unwrap().to_string(), "127.0.0.1:5001");
        cfg.server.host = "not a host".into();
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }
}
