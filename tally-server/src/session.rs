use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::broadcast::BroadcastHub;
use crate::error::ServiceError;
use crate::photo;
use tally_core::{
    BoardEvent, BoardEventBus, BoardEventHandler, BoardHandle, Capability, StandingRow,
    StandingsEngine, can_edit, create_board, transfer_ownership, validate_score_draft,
};
use tally_persistence::{BoardStore, ProfileStore};
use tally_types::{Board, BoardCommand, BoardError, BoardId, RootState, UserIdentity};

/// Result of opening a board through a share reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenedBoard {
    pub board: Board,
    pub can_edit: bool,
}

/// One profile's view of the world: the root aggregate, its stores, and
/// the live channel hub. All collaborators are injected at construction
/// so tests can swap in doubles.
///
/// Reconciliation model: every local change is saved to the profile
/// store (best-effort), written through to the shared record, and
/// broadcast as a full snapshot. Inbound snapshots and shared-record
/// fetches replace local state wholesale. There is no merge; whichever
/// write is observed last wins, independently per board.
pub struct SessionManager {
    root: RwLock<RootState>,
    profile_store: Arc<dyn ProfileStore>,
    board_store: Arc<dyn BoardStore>,
    hub: Arc<BroadcastHub>,
    events: std::sync::Mutex<BoardEventBus>,
}

impl SessionManager {
    /// Seed the session: the stored root if one exists, else a fresh
    /// default around the profile identity (itself loaded or generated
    /// once). Storage failures fall back to defaults and are never
    /// fatal.
    pub async fn bootstrap(
        profile_store: Arc<dyn ProfileStore>,
        board_store: Arc<dyn BoardStore>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        let identity = match profile_store.load_identity().await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                let identity = UserIdentity {
                    id: Uuid::new_v4(),
                    name: "Player".to_string(),
                };
                if let Err(error) = profile_store.save_identity(&identity).await {
                    warn!("could not persist fresh identity: {error:#}");
                }
                info!(user_id = %identity.id, "generated profile identity");
                identity
            }
            Err(error) => {
                warn!("identity read failed, using a fresh one: {error:#}");
                UserIdentity {
                    id: Uuid::new_v4(),
                    name: "Player".to_string(),
                }
            }
        };

        let mut root = match profile_store.load_root().await {
            Ok(Some(root)) => root,
            Ok(None) => RootState::new(identity.clone()),
            Err(error) => {
                warn!("root state read failed, starting from default: {error:#}");
                RootState::new(identity.clone())
            }
        };
        // The identity blob is authoritative for who we are.
        root.current_user = identity;

        Self {
            root: RwLock::new(root),
            profile_store,
            board_store,
            hub,
            events: std::sync::Mutex::new(BoardEventBus::new()),
        }
    }

    pub fn register_event_handler(&self, handler: Box<dyn BoardEventHandler>) {
        if let Ok(mut events) = self.events.lock() {
            events.add_handler(handler);
        }
    }

    fn emit(&self, event: BoardEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.publish(event);
        }
    }

    pub async fn current_user(&self) -> UserIdentity {
        self.root.read().await.current_user.clone()
    }

    pub async fn root_snapshot(&self) -> RootState {
        self.root.read().await.clone()
    }

    /// Best-effort local round-trip: a failed save is logged and
    /// swallowed, never surfaced.
    async fn persist_root(&self, root: &RootState) {
        if let Err(error) = self.profile_store.save_root(root).await {
            warn!("best-effort root save failed: {error:#}");
        }
    }

    /// Write-through plus broadcast, the two outbound legs of every
    /// local edit. The shared-store write is best-effort like the local
    /// one.
    async fn push_board(&self, board: &Board) {
        if let Err(error) = self.board_store.upsert(board).await {
            warn!(board_id = %board.id, "write-through to shared store failed: {error:#}");
        }
        self.hub.publish(board);
    }

    pub async fn create_board(&self, name: &str) -> Board {
        let (board, snapshot) = {
            let mut root = self.root.write().await;
            let board = create_board(name, root.current_user.id);
            root.boards.insert(0, board.clone());
            root.selected_board_id = Some(board.id);
            (board, root.clone())
        };

        info!(board_id = %board.id, "created board");
        self.emit(BoardEvent::BoardCreated {
            board_id: board.id,
            name: board.name.clone(),
            owner_id: board.owner_id,
        });
        self.persist_root(&snapshot).await;
        self.push_board(&board).await;
        board
    }

    pub async fn select_board(&self, board_id: BoardId) -> Result<(), ServiceError> {
        let snapshot = {
            let mut root = self.root.write().await;
            if root.find_board(board_id).is_none() {
                return Err(ServiceError::BoardNotFound(board_id));
            }
            root.selected_board_id = Some(board_id);
            root.clone()
        };

        self.persist_root(&snapshot).await;
        Ok(())
    }

    /// Open a board through a share reference: fetch the shared record
    /// once, prepend it if we do not have the board yet, replace our
    /// copy if we do. Staying current afterwards is the live channel's
    /// job. A failed fetch counts as absence and falls back to whatever
    /// is already local.
    pub async fn open_shared_board(
        &self,
        board_id: BoardId,
        presented_token: Option<&str>,
    ) -> Result<OpenedBoard, ServiceError> {
        let fetched = match self.board_store.get(board_id).await {
            Ok(found) => found,
            Err(error) => {
                warn!(%board_id, "shared record fetch failed: {error:#}");
                None
            }
        };

        let (board, snapshot) = {
            let mut root = self.root.write().await;
            let board = match fetched {
                Some(shared) => {
                    match root.find_board_mut(board_id) {
                        Some(local) => *local = shared.clone(),
                        None => root.boards.insert(0, shared.clone()),
                    }
                    shared
                }
                None => root
                    .find_board(board_id)
                    .cloned()
                    .ok_or(ServiceError::BoardNotFound(board_id))?,
            };
            root.selected_board_id = Some(board_id);
            (board, root.clone())
        };

        self.persist_root(&snapshot).await;

        let can_edit = can_edit(&board, snapshot.current_user.id, presented_token);
        Ok(OpenedBoard { board, can_edit })
    }

    /// Apply a locally-originated command. Capability-gated commands
    /// from a context without edit rights are silent no-ops: the board
    /// comes back unchanged and nothing is persisted or broadcast.
    pub async fn apply_command(
        &self,
        board_id: BoardId,
        presented_token: Option<&str>,
        command: BoardCommand,
    ) -> Result<Board, ServiceError> {
        if let BoardCommand::RecordScore { draft } = &command {
            validate_score_draft(draft).map_err(ServiceError::InvalidScore)?;
        }

        let (board, snapshot, event) = {
            let mut root = self.root.write().await;
            let user_id = root.current_user.id;
            let board = root
                .find_board_mut(board_id)
                .ok_or(ServiceError::BoardNotFound(board_id))?;

            let capability = Capability::from_flag(can_edit(board, user_id, presented_token));
            let event = match command {
                BoardCommand::AddPlayer { name } => BoardHandle::new(board, capability)
                    .add_player(&name)
                    .map(|player_id| BoardEvent::PlayerAdded {
                        board_id,
                        player_id,
                        name,
                    }),
                BoardCommand::AddActivity { name } => BoardHandle::new(board, capability)
                    .add_activity(&name)
                    .map(|activity_id| BoardEvent::ActivityAdded {
                        board_id,
                        activity_id,
                        name,
                    }),
                BoardCommand::RecordScore { draft } => BoardHandle::new(board, capability)
                    .add_score(&draft)
                    .map(|score_id| BoardEvent::ScoreRecorded { board_id, score_id }),
                BoardCommand::UndoLastScore => BoardHandle::new(board, capability)
                    .remove_last_score()
                    .map(|score_id| BoardEvent::LastScoreRemoved { board_id, score_id }),
                BoardCommand::ClearScores => {
                    let removed = BoardHandle::new(board, capability).clear_scores();
                    (removed > 0).then_some(BoardEvent::ScoresCleared { board_id, removed })
                }
                BoardCommand::RenameBoard { name } => BoardHandle::new(board, capability)
                    .rename(&name)
                    .then_some(BoardEvent::BoardRenamed { board_id, name }),
                BoardCommand::SetPlayerPhoto { player_id, photo } => {
                    BoardHandle::new(board, capability)
                        .set_player_photo(player_id, photo)
                        .then_some(BoardEvent::PlayerPhotoChanged { board_id, player_id })
                }
                BoardCommand::TransferOwnership { new_owner_id } => {
                    transfer_ownership(board, user_id, new_owner_id).map_err(
                        |error| match error {
                            BoardError::NotOwner => ServiceError::NotOwner,
                            other => {
                                warn!(?other, "unexpected transfer failure");
                                ServiceError::NotOwner
                            }
                        },
                    )?;
                    Some(BoardEvent::OwnershipTransferred {
                        board_id,
                        new_owner_id,
                    })
                }
            };

            (board.clone(), root.clone(), event)
        };

        // A gated-out or empty-history command produced no event and
        // changed nothing: skip persistence and broadcast entirely.
        if let Some(event) = event {
            self.emit(event);
            self.persist_root(&snapshot).await;
            self.push_board(&board).await;
        }
        Ok(board)
    }

    /// Decode, bound and inline an uploaded image, then attach it to
    /// the player. Decode failures surface and leave the photo as it
    /// was.
    pub async fn attach_photo(
        &self,
        board_id: BoardId,
        player_id: Uuid,
        bytes: &[u8],
        max_dimension: u32,
        quality: u8,
    ) -> Result<Board, ServiceError> {
        let inline = photo::ingest_photo(bytes, max_dimension, quality)?;
        self.apply_command(
            board_id,
            None,
            BoardCommand::SetPlayerPhoto {
                player_id,
                photo: Some(inline),
            },
        )
        .await
    }

    /// Inbound leg of the live channel: replace our copy of the board
    /// with the received snapshot, unconditionally. Never gated by edit
    /// capability and never written back to the shared store (that
    /// write-through belongs to the editing context).
    pub async fn apply_remote_snapshot(&self, board: Board) {
        let board_id = board.id;
        let snapshot = {
            let mut root = self.root.write().await;
            match root.find_board_mut(board.id) {
                Some(local) => *local = board,
                None => root.boards.insert(0, board),
            }
            root.clone()
        };

        self.emit(BoardEvent::BoardReplaced { board_id });
        self.persist_root(&snapshot).await;
    }

    /// Leaderboard rows for one board, recomputed from the full score
    /// history on every call.
    pub async fn standings(&self, board_id: BoardId) -> Result<Vec<StandingRow>, ServiceError> {
        let root = self.root.read().await;
        let board = root
            .find_board(board_id)
            .ok_or(ServiceError::BoardNotFound(board_id))?;

        let totals = StandingsEngine::compute(&board.state.scores);
        Ok(StandingsEngine::ranked(&board.state.players, &totals))
    }

    /// Human-readable interchange form of the whole root aggregate.
    pub async fn export_root(&self) -> String {
        let root = self.root.read().await;
        serde_json::to_string_pretty(&*root).unwrap_or_else(|error| {
            warn!("root export failed: {error}");
            String::new()
        })
    }

    pub async fn export_board(&self, board_id: BoardId) -> Result<String, ServiceError> {
        let root = self.root.read().await;
        let board = root
            .find_board(board_id)
            .ok_or(ServiceError::BoardNotFound(board_id))?;

        serde_json::to_string_pretty(board)
            .map_err(|error| ServiceError::ImportFailed(error.to_string()))
    }

    /// Replace the whole root aggregate with an imported payload. A
    /// payload that fails to parse is rejected and the prior state is
    /// left untouched; there is no partial import or merge.
    pub async fn import_root(&self, payload: &str) -> Result<RootState, ServiceError> {
        let imported: RootState = serde_json::from_str(payload)
            .map_err(|error| ServiceError::ImportFailed(error.to_string()))?;

        let snapshot = {
            let mut root = self.root.write().await;
            *root = imported;
            root.clone()
        };

        info!(boards = snapshot.boards.len(), "root state replaced by import");
        self.persist_root(&snapshot).await;
        Ok(snapshot)
    }
}
