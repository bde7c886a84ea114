use clap::Parser;
use std::sync::Arc;
use tokio::sync::Notify;

use tradeproxy::cli::Cli;
use tradeproxy::config::{AppState, Config};
use tradeproxy::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // `.env` is optional; real environment variables still apply
    let dotenv_result = dotenv::dotenv();

    let mut cfg = Config::load_from(&cli.config)?;
    cli.apply(&mut cfg);

    logger::init(&cfg)?;
    if let Err(e) = dotenv_result {
        tracing::debug!("No .env file loaded: {e}");
    }

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(AppState::new(cfg)?);
    let shutdown = Arc::new(Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown))?;

    server::run(listener, state, shutdown).await;
    Ok(())
}
