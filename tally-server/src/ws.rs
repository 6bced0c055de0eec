use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use warp::ws::{Message, WebSocket};

use crate::broadcast::BroadcastHub;
use crate::session::SessionManager;
use tally_types::{BoardId, SyncMessage};

/// One peer attached to a board's live channel. Outbound: every
/// snapshot published for the board is forwarded as JSON. Inbound: a
/// snapshot pushed by the peer replaces the session's copy and is
/// republished to the other subscribers. The publisher's own receiver
/// sees its message again; that loop is harmless because reapplying an
/// identical snapshot changes nothing.
pub async fn handle_board_socket(
    websocket: WebSocket,
    board_id: BoardId,
    session: Arc<SessionManager>,
    hub: Arc<BroadcastHub>,
) {
    info!(%board_id, "peer attached to board channel");

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let mut updates = hub.subscribe(board_id);

    let outgoing = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(board) => {
                    let payload = match serde_json::to_string(&SyncMessage::Snapshot { board }) {
                        Ok(payload) => payload,
                        Err(error) => {
                            warn!("failed to encode snapshot: {error}");
                            continue;
                        }
                    };
                    if ws_sender.send(Message::text(payload)).await.is_err() {
                        break;
                    }
                }
                // At-most-once channel: missed snapshots stay missed,
                // the next one carries the whole state anyway.
                Err(RecvError::Lagged(missed)) => {
                    debug!(%board_id, missed, "peer lagged behind the snapshot channel");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        let message = match result {
            Ok(message) => message,
            Err(error) => {
                warn!(%board_id, "socket error: {error}");
                break;
            }
        };

        if message.is_close() {
            break;
        }
        let Ok(text) = message.to_str() else {
            continue;
        };

        match serde_json::from_str::<SyncMessage>(text) {
            Ok(SyncMessage::Snapshot { board }) => {
                if board.id != board_id {
                    warn!(%board_id, pushed = %board.id, "snapshot for the wrong channel ignored");
                    continue;
                }
                session.apply_remote_snapshot(board.clone()).await;
                hub.publish(&board);
            }
            Err(error) => {
                warn!(%board_id, "ignoring malformed sync message: {error}");
            }
        }
    }

    outgoing.abort();
    info!(%board_id, "peer detached from board channel");
}
