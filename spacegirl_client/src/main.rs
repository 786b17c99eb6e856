//! Standalone headless client binary.
//!
//! Usage:
//!   cargo run -p spacegirl_client -- [--addr 127.0.0.1:3001] [--config scene.json]
//!                                    [--frame-hz 60] [--offline]
//!
//! The client runs the character frame loop against a null renderer, publishes
//! the character pose to the relay every frame, and logs remote updates.
//!
//! Console commands:
//!   key <name> down|up      - Press or release a key (w/a/s/d, arrows, c)
//!   touch start <x> <y>     - Begin a drag
//!   touch move <x> <y>      - Move the drag
//!   touch end               - End the drag
//!   camera                  - Cycle camera mode
//!   release                 - Release all keys and the drag
//!   status                  - Show session status
//!   quit                    - Exit client

use std::env;
use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use spacegirl_client::{RelayClient, Session};
use spacegirl_shared::{config::SceneConfig, render::NullRenderer};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct Args {
    cfg: SceneConfig,
    offline: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().collect();
    parse_args_from(&args)
}

fn parse_args_from(args: &[String]) -> anyhow::Result<Args> {
    // Load the config file first so explicit flags override it.
    let mut cfg = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = &args[i + 1];
            let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
            SceneConfig::from_json_str(&text).with_context(|| format!("parse {path}"))?
        }
        _ => SceneConfig::default(),
    };

    let mut offline = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                cfg.relay_addr = args[i + 1].clone();
                i += 2;
            }
            "--frame-hz" if i + 1 < args.len() => {
                let hz = &args[i + 1];
                cfg.frame_hz = hz.parse().with_context(|| format!("parse --frame-hz {hz}"))?;
                i += 2;
            }
            "--offline" => {
                offline = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    Ok(Args { cfg, offline })
}

/// Connects unless `offline`; a relay that cannot be reached leaves the
/// client running offline.
async fn open_relay(cfg: &SceneConfig, offline: bool) -> Option<RelayClient> {
    if offline {
        return None;
    }
    match RelayClient::connect(cfg).await {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, relay = %cfg.relay_addr, "Relay unreachable; continuing offline");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let Args { cfg, offline } = parse_args()?;
    info!(relay = %cfg.relay_addr, frame_hz = cfg.frame_hz, offline, "Starting client");

    let mut session = Session::new(&cfg, None).context("create session")?;
    let mut relay = open_relay(&cfg, offline).await;
    let mut renderer = NullRenderer;

    // Set up console input channel.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).is_err() {
                break;
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("Client running. Type 'status' for info, 'quit' to exit.");
    println!();

    let frame_interval = Duration::from_secs_f32(1.0 / cfg.frame_hz.max(1) as f32);
    let mut next_frame = tokio::time::Instant::now();

    loop {
        // Input events land before the frame that consumes them.
        while let Ok(line) = console_rx.try_recv() {
            if matches!(line.as_str(), "quit" | "exit") {
                info!("Client shutting down");
                return Ok(());
            }
            match session.exec_console(&line) {
                Ok(output) => {
                    for line in output {
                        println!("{}", line);
                    }
                }
                Err(e) => println!("Error: {}", e),
            }
        }

        let frame = session.frame(frame_interval.as_secs_f32());
        session.render(&mut renderer);

        if let Some(client) = relay.as_mut() {
            if let Some(frame) = frame {
                if let Err(e) = client.send_move(&frame.pose).await {
                    warn!(error = %e, "Failed to publish move; continuing offline");
                    relay = None;
                }
            }
        }

        if let Some(client) = relay.as_mut() {
            for remote in client.poll_moves() {
                match remote.update() {
                    Some(update) => debug!(position = ?update.position, "Remote player moved"),
                    None => debug!(data = %remote.data, "Remote move with foreign payload"),
                }
            }
            if !client.is_connected() {
                warn!("Relay connection lost; continuing offline");
                relay = None;
            }
        }

        next_frame += frame_interval;
        tokio::time::sleep_until(next_frame).await;
    }
}
