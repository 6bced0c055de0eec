use tally_types::{ActivityId, BoardId, PlayerId, ScoreId, UserId};

/// Things that happen to a board, published after the mutation has been
/// applied. Observers use these for logging and UI refresh; they are
/// not the sync transport (that carries full snapshots).
#[derive(Debug, Clone)]
pub enum BoardEvent {
    BoardCreated {
        board_id: BoardId,
        name: String,
        owner_id: UserId,
    },
    PlayerAdded {
        board_id: BoardId,
        player_id: PlayerId,
        name: String,
    },
    PlayerPhotoChanged {
        board_id: BoardId,
        player_id: PlayerId,
    },
    ActivityAdded {
        board_id: BoardId,
        activity_id: ActivityId,
        name: String,
    },
    ScoreRecorded {
        board_id: BoardId,
        score_id: ScoreId,
    },
    LastScoreRemoved {
        board_id: BoardId,
        score_id: ScoreId,
    },
    ScoresCleared {
        board_id: BoardId,
        removed: usize,
    },
    BoardRenamed {
        board_id: BoardId,
        name: String,
    },
    OwnershipTransferred {
        board_id: BoardId,
        new_owner_id: UserId,
    },
    BoardReplaced {
        board_id: BoardId,
    },
}

impl BoardEvent {
    pub fn board_id(&self) -> BoardId {
        match self {
            BoardEvent::BoardCreated { board_id, .. } => *board_id,
            BoardEvent::PlayerAdded { board_id, .. } => *board_id,
            BoardEvent::PlayerPhotoChanged { board_id, .. } => *board_id,
            BoardEvent::ActivityAdded { board_id, .. } => *board_id,
            BoardEvent::ScoreRecorded { board_id, .. } => *board_id,
            BoardEvent::LastScoreRemoved { board_id, .. } => *board_id,
            BoardEvent::ScoresCleared { board_id, .. } => *board_id,
            BoardEvent::BoardRenamed { board_id, .. } => *board_id,
            BoardEvent::OwnershipTransferred { board_id, .. } => *board_id,
            BoardEvent::BoardReplaced { board_id, .. } => *board_id,
        }
    }
}

/// Event handler trait for processing board events
pub trait BoardEventHandler: Send {
    fn handle_event(&mut self, event: BoardEvent);
}

/// Simple event bus for distributing board events
pub struct BoardEventBus {
    handlers: Vec<Box<dyn BoardEventHandler>>,
}

impl BoardEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn BoardEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: BoardEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }
}

impl Default for BoardEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    struct RecordingHandler {
        seen: Arc<Mutex<Vec<BoardId>>>,
    }

    impl BoardEventHandler for RecordingHandler {
        fn handle_event(&mut self, event: BoardEvent) {
            self.seen.lock().unwrap().push(event.board_id());
        }
    }

    #[test]
    fn test_event_bus_delivers_to_every_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = BoardEventBus::new();
        bus.add_handler(Box::new(RecordingHandler { seen: seen.clone() }));
        bus.add_handler(Box::new(RecordingHandler { seen: seen.clone() }));

        let board_id = Uuid::new_v4();
        bus.publish(BoardEvent::ScoresCleared {
            board_id,
            removed: 3,
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|id| *id == board_id));
    }

    #[test]
    fn test_board_id_accessor_covers_variants() {
        let board_id = Uuid::new_v4();
        let events = vec![
            BoardEvent::BoardCreated {
                board_id,
                name: "Cup".into(),
                owner_id: Uuid::new_v4(),
            },
            BoardEvent::ScoreRecorded {
                board_id,
                score_id: Uuid::new_v4(),
            },
            BoardEvent::BoardReplaced { board_id },
        ];

        for event in events {
            assert_eq!(event.board_id(), board_id);
        }
    }
}
