//! Socket-based integration tests for relay fan-out.

use std::time::Duration;

use spacegirl_relay::relay::bind_ephemeral;
use spacegirl_shared::math::{Euler, Vec3};
use spacegirl_shared::net::{MoveUpdate, NetMsg};
use spacegirl_tests::{init_tracing, join, wait_for_peers};

const QUIET: Duration = Duration::from_millis(200);
const WAIT: Duration = Duration::from_secs(2);

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn move_reaches_every_other_peer_once() -> anyhow::Result<()> {
    init_tracing();
    let (relay, addr) = bind_ephemeral().await?;

    let mut a = join(&relay, addr).await?;
    let mut b = join(&relay, addr).await?;
    let mut c = join(&relay, addr).await?;
    assert_eq!(relay.peers().len(), 3);

    let update = MoveUpdate {
        position: Vec3::new(1.0, 0.5, -2.0),
        rotation: Euler::new(0.0, 0.25, 0.0),
    };
    a.send_move(&update).await?;

    for peer in [&mut b, &mut c] {
        let got = peer.recv_move_timeout(WAIT).await.expect("relayed move");
        assert_eq!(got.update(), Some(update));
        assert!(peer.recv_move_timeout(QUIET).await.is_none());
    }
    assert!(a.recv_move_timeout(QUIET).await.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn disconnected_peer_is_forgotten() -> anyhow::Result<()> {
    init_tracing();
    let (relay, addr) = bind_ephemeral().await?;

    let mut a = join(&relay, addr).await?;
    let mut b = join(&relay, addr).await?;
    let c = join(&relay, addr).await?;
    wait_for_peers(&relay, 3, WAIT).await?;

    drop(c);
    wait_for_peers(&relay, 2, WAIT).await?;

    a.send_move(&MoveUpdate::default()).await?;
    let got = b.recv_move_timeout(WAIT).await.expect("relayed move");
    assert_eq!(got.update(), Some(MoveUpdate::default()));
    assert!(a.recv_move_timeout(QUIET).await.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn foreign_payloads_are_relayed_verbatim() -> anyhow::Result<()> {
    init_tracing();
    let (relay, addr) = bind_ephemeral().await?;

    let mut a = join(&relay, addr).await?;
    let mut b = join(&relay, addr).await?;

    let data = serde_json::json!({ "hello": [1, 2, 3], "nested": { "ok": true } });
    a.send(&NetMsg::PlayerMove(data.clone())).await?;

    let got = b.recv_move_timeout(WAIT).await.expect("relayed payload");
    assert_eq!(got.data, data);
    assert_eq!(got.update(), None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn per_sender_order_survives_the_relay() -> anyhow::Result<()> {
    init_tracing();
    let (relay, addr) = bind_ephemeral().await?;

    let mut a = join(&relay, addr).await?;
    let mut b = join(&relay, addr).await?;

    for i in 0..25 {
        let update = MoveUpdate {
            position: Vec3::new(i as f32, 0.0, 0.0),
            rotation: Euler::IDENTITY,
        };
        a.send_move(&update).await?;
    }

    for i in 0..25 {
        let got = b.recv_move_timeout(WAIT).await.expect("relayed move");
        let update = got.update().expect("move payload");
        assert_eq!(update.position.x, i as f32);
    }
    Ok(())
}
