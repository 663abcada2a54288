//! Local server with a fixed start order and short polls
//!
//! Run with: cargo run -p halma-server --example run_server [PORT]

use halma_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("halma_server=debug,halma_core=debug")
        .init();

    let port = match std::env::args().nth(1) {
        Some(port) => port.parse()?,
        None => ServerConfig::default().port,
    };
    let config = ServerConfig {
        port,
        seed: Some(1),
        poll_timeout_ms: 1000,
        ..ServerConfig::default()
    };

    run_server(config).await
}
