use std::time::Duration;

use dotenvy::dotenv;
use tokio::task::JoinError;
use tracing::{error, info};
use uuid::Uuid;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Load `.env` and config once, then install the subscriber the config asks for.
/// A broken config still gets a plain subscriber so the failure is logged.
fn load_config() -> Option<configs::AppConfig> {
    dotenv().ok();
    match configs::AppConfig::load() {
        Ok(cfg) => {
            common::utils::logging::init_logging(cfg.logging.json);
            info!(service = "sleep-tracker", event = "logger_init", json = cfg.logging.json, "tracing subscriber initialized");
            Some(cfg)
        }
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "sleep-tracker", event = "config_invalid", error = %e, "failed to load configuration");
            None
        }
    }
}

fn exit_code(res: Result<anyhow::Result<()>, JoinError>, service_id: Uuid, pid: u32) -> std::process::ExitCode {
    match res {
        Ok(Ok(())) => {
            info!(service = "sleep-tracker", event = "stop", %service_id, pid, "server stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!(service = "sleep-tracker", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
        Err(e) => {
            error!(service = "sleep-tracker", event = "task_join_error", error = %e, "server task join error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn main() -> std::process::ExitCode {
    let Some(cfg) = load_config() else {
        return std::process::ExitCode::FAILURE;
    };
    let worker_threads = cfg.server.worker_threads;

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "sleep-tracker",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "sleep-tracker", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "sleep-tracker",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "sleep tracker starting"
    );

    rt.block_on(async move {
        let mut server_task = tokio::spawn(server::run(cfg));

        tokio::select! {
            res = &mut server_task => exit_code(res, service_id, pid),
            _ = tokio::signal::ctrl_c() => {
                info!(service = "sleep-tracker", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
                // server::run drains in-flight requests on the same signal
                match tokio::time::timeout(DRAIN_TIMEOUT, server_task).await {
                    Ok(res) => exit_code(res, service_id, pid),
                    Err(_) => {
                        error!(service = "sleep-tracker", event = "drain_timeout", "connections still open, exiting");
                        std::process::ExitCode::FAILURE
                    }
                }
            }
        }
    })
}
