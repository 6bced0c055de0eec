use dashmap::DashMap;
use tokio::sync::broadcast;

use tally_types::{Board, BoardId};

/// Name of a board's live channel, derived deterministically from its
/// id so every context lands on the same channel.
pub fn channel_name(board_id: BoardId) -> String {
    format!("board:{board_id}")
}

/// Per-board fan-out of full `Board` snapshots.
///
/// Delivery is best-effort and at-most-once: a subscriber that lags
/// past the channel capacity simply misses snapshots, and nothing is
/// redelivered. That is acceptable because every message carries the
/// whole board and receivers replace their copy unconditionally — the
/// last snapshot observed wins. Applying the same snapshot twice is a
/// no-op on anything derived from it.
pub struct BroadcastHub {
    channels: DashMap<String, broadcast::Sender<Board>>,
    capacity: usize,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    pub fn subscribe(&self, board_id: BoardId) -> broadcast::Receiver<Board> {
        self.channels
            .entry(channel_name(board_id))
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send the snapshot to every current subscriber of the board's
    /// channel. Returns how many receivers it reached; zero when nobody
    /// is listening.
    pub fn publish(&self, board: &Board) -> usize {
        match self.channels.get(&channel_name(board.id)) {
            Some(sender) => sender.send(board.clone()).unwrap_or(0),
            None => 0,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Drop channels nobody subscribes to anymore.
    pub fn prune_idle(&self) {
        self.channels
            .retain(|_, sender| sender.receiver_count() > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::BoardState;
    use uuid::Uuid;

    fn test_board(name: &str) -> Board {
        Board {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id: Uuid::new_v4(),
            edit_token: Uuid::new_v4().to_string(),
            state: BoardState::default(),
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_published_snapshots() {
        let hub = BroadcastHub::new(8);
        let board = test_board("Cup");

        let mut first = hub.subscribe(board.id);
        let mut second = hub.subscribe(board.id);

        assert_eq!(hub.publish(&board), 2);
        assert_eq!(first.recv().await.unwrap().id, board.id);
        assert_eq!(second.recv().await.unwrap().id, board.id);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_reaches_nobody() {
        let hub = BroadcastHub::new(8);
        assert_eq!(hub.publish(&test_board("Cup")), 0);
    }

    #[tokio::test]
    async fn test_channels_are_scoped_per_board() {
        let hub = BroadcastHub::new(8);
        let cup = test_board("Cup");
        let league = test_board("League");

        let mut cup_rx = hub.subscribe(cup.id);
        let _league_rx = hub.subscribe(league.id);

        hub.publish(&cup);
        assert_eq!(cup_rx.recv().await.unwrap().name, "Cup");
        assert!(cup_rx.try_recv().is_err()); // nothing cross-delivered
        assert_eq!(hub.channel_count(), 2);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_misses_snapshots() {
        let hub = BroadcastHub::new(1);
        let mut board = test_board("v1");
        let mut rx = hub.subscribe(board.id);

        hub.publish(&board);
        board.name = "v2".to_string();
        hub.publish(&board);

        // Capacity 1: the first snapshot is gone, and that is fine —
        // the survivor carries the whole state.
        match rx.recv().await {
            Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                assert_eq!(missed, 1);
            }
            other => panic!("expected lag, got {other:?}"),
        }
        assert_eq!(rx.recv().await.unwrap().name, "v2");
    }

    #[tokio::test]
    async fn test_prune_idle_drops_abandoned_channels() {
        let hub = BroadcastHub::new(8);
        let board = test_board("Cup");

        let rx = hub.subscribe(board.id);
        assert_eq!(hub.channel_count(), 1);

        drop(rx);
        hub.prune_idle();
        assert_eq!(hub.channel_count(), 0);
    }
}
