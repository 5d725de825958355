//! # Boardcast Client
//!
//! Headless board observer. Connects to a server, subscribes to one
//! board, and keeps a live local copy of it: snapshot on connect,
//! incremental events afterwards, full refetch whenever the stream
//! tells it incremental patching is not enough.
//!
//! Mostly useful for watching a board from a terminal and as a working
//! reference for embedding the library.
//!
//! ## Usage
//!
//! ```bash
//! BOARDCAST_URL=http://localhost:4000 \
//! BOARDCAST_USER_ID=<uuid> \
//! BOARDCAST_BOARD_ID=<uuid> \
//! cargo run -p boardcast-client
//! ```

use anyhow::Context;
use boardcast_client::activity::{ActivityCache, Notifier};
use boardcast_client::api::ApiClient;
use boardcast_client::reconciler::BoardState;
use boardcast_client::socket::{BoardSocket, SocketUpdate};
use boardcast_shared::events::BoardEvent;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_new_activity(&self, board_id: Uuid) {
        tracing::info!(%board_id, "new activity on board");
    }
}

fn env_uuid(key: &str) -> anyhow::Result<Uuid> {
    let raw = std::env::var(key).with_context(|| format!("{key} must be set"))?;
    raw.parse().with_context(|| format!("{key} must be a UUID"))
}

fn print_board(state: &BoardState) {
    for list in &state.lists {
        println!("== {} ==", list.list.title);
        for task in &list.tasks {
            let marker = task.assignee_id.map_or(String::new(), |id| format!(" [{}]", id));
            println!("  - {}{}", task.content, marker);
        }
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boardcast_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("BOARDCAST_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());
    let user_id = env_uuid("BOARDCAST_USER_ID")?;
    let board_id = env_uuid("BOARDCAST_BOARD_ID")?;

    let connection_id = Uuid::new_v4();
    let api = ApiClient::new(base_url.clone(), user_id, connection_id);
    let mut activity = ActivityCache::new(api.clone(), LogNotifier);

    let ws_url = format!("{}/ws", base_url.replacen("http", "ws", 1));
    let mut socket = BoardSocket::spawn(ws_url, board_id, connection_id);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        %board_id,
        "boardcast client starting"
    );

    let snapshot = api.board_snapshot(board_id).await.context("initial snapshot failed")?;
    let mut state = BoardState::from_snapshot(snapshot);
    print_board(&state);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received, exiting");
                socket.shutdown();
                return Ok(());
            }
            update = socket.next() => {
                let Some(update) = update else {
                    tracing::info!("socket task stopped");
                    return Ok(());
                };
                match update {
                    SocketUpdate::Connected => {
                        // Events missed while disconnected are gone for good
                        let snapshot = api.board_snapshot(board_id).await?;
                        state.replace_from_snapshot(snapshot);
                        print_board(&state);
                    }
                    SocketUpdate::Event(event) => {
                        if let BoardEvent::ActivityUpdated { board_id } = event {
                            if let Err(e) = activity.on_activity_updated(board_id, None).await {
                                tracing::warn!(error = %e, "activity refresh failed");
                            }
                            continue;
                        }
                        state.apply(&event);
                        if state.needs_refresh {
                            let snapshot = api.board_snapshot(board_id).await?;
                            state.replace_from_snapshot(snapshot);
                        }
                        print_board(&state);
                    }
                }
            }
        }
    }
}
