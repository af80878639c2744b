use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

mod annotation;
mod config;
mod handler;
mod http;
mod logger;
mod server;

/// How long shutdown waits for in-flight connections to finish
const DRAIN_DEADLINE: Duration = Duration::from_secs(30);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // The upload directory must exist before the first request arrives
    std::fs::create_dir_all(&cfg.app.upload_dir)?;

    if cfg.app.secret_key == config::DEFAULT_SECRET_KEY {
        logger::log_warning(
            "app.secret_key is the default placeholder; override it before deploying",
        );
    }

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    logger::log_server_start(&addr, &cfg);

    run_accept_loop(&listener, &state, &active_connections, &signals).await;

    drain_connections(&active_connections).await;
    logger::log_shutdown_complete();
    Ok(())
}

/// Accept connections until a shutdown signal arrives
async fn run_accept_loop(
    listener: &TcpListener,
    state: &Arc<config::AppState>,
    active_connections: &Arc<AtomicUsize>,
    signals: &Arc<server::SignalHandler>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        server::accept_connection(stream, peer_addr, state, active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = signals.shutdown.notified() => {
                logger::log_shutdown_started();
                break;
            }
        }
    }
}

/// Wait for in-flight connections to close, up to the drain deadline
async fn drain_connections(active_connections: &Arc<AtomicUsize>) {
    let deadline = tokio::time::Instant::now() + DRAIN_DEADLINE;
    loop {
        let open = active_connections.load(Ordering::SeqCst);
        if open == 0 {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_drain_timeout(open);
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
