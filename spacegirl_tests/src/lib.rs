//! Shared helpers for the integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use spacegirl_client::RelayClient;
use spacegirl_relay::PeerRelay;
use spacegirl_shared::config::SceneConfig;

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

/// Client config pointing at a relay bound on `addr`.
pub fn scene_for(addr: SocketAddr) -> SceneConfig {
    SceneConfig {
        relay_addr: addr.to_string(),
        ..SceneConfig::default()
    }
}

/// Connects a client and waits until the relay has registered it.
pub async fn join(relay: &PeerRelay, addr: SocketAddr) -> anyhow::Result<RelayClient> {
    let client = RelayClient::connect(&scene_for(addr)).await?;
    relay.accept_one().await?;
    Ok(client)
}

/// Polls the registry until it holds `n` peers or `within` elapses.
pub async fn wait_for_peers(relay: &PeerRelay, n: usize, within: Duration) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + within;
    while relay.peers().len() != n {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("expected {n} peers, have {}", relay.peers().len());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}
