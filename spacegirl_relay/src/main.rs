//! Standalone relay binary.
//!
//! Usage:
//!   cargo run -p spacegirl_relay -- [--addr 0.0.0.0:3001] [--config relay.json]
//!
//! The relay accepts peers from any address and forwards each `player-move`
//! frame to every other connected peer.

use std::env;

use anyhow::Context;
use spacegirl_relay::PeerRelay;
use spacegirl_shared::config::RelayConfig;
use tracing::info;

fn parse_args() -> anyhow::Result<RelayConfig> {
    let args: Vec<String> = env::args().collect();
    let mut cfg = RelayConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                let path = &args[i + 1];
                let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
                let file =
                    RelayConfig::from_json_str(&text).with_context(|| format!("parse {path}"))?;
                cfg.listen_addr = file.listen_addr;
                i += 2;
            }
            "--addr" if i + 1 < args.len() => {
                cfg.listen_addr = args[i + 1].clone();
                i += 2;
            }
            _ => i += 1,
        }
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args()?;
    let relay = PeerRelay::bind(&cfg).await.context("bind relay")?;
    let local = relay.local_addr()?;
    info!(%local, "Relay running");

    relay.run().await
}
