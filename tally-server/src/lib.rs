use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;

pub mod broadcast;
pub mod config;
pub mod error;
pub mod photo;
pub mod session;
pub mod share;
pub mod ws;

use crate::broadcast::BroadcastHub;
use crate::config::Config;
use crate::error::ServiceError;
use crate::session::SessionManager;
use crate::share::ShareLink;
use tally_types::BoardCommand;

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

#[derive(Deserialize)]
struct CreateBoardRequest {
    name: String,
}

#[derive(serde::Serialize, Deserialize)]
struct ShareLinksResponse {
    view: String,
    manage: Option<String>,
}

fn error_status(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::BoardNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::NotOwner => StatusCode::FORBIDDEN,
        ServiceError::InvalidScore(_)
        | ServiceError::ImportFailed(_)
        | ServiceError::Photo(_) => StatusCode::BAD_REQUEST,
    }
}

fn error_reply(error: &ServiceError) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": error.to_string() })),
        error_status(error),
    )
}

pub fn create_routes(
    session: Arc<SessionManager>,
    hub: Arc<BroadcastHub>,
    config: Config,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let session_filter = warp::any().map({
        let session = session.clone();
        move || session.clone()
    });

    let hub_filter = warp::any().map({
        let hub = hub.clone();
        move || hub.clone()
    });

    let config_filter = warp::any().map({
        let config = config.clone();
        move || config.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Create a new board owned by this profile
    let create_board = warp::path("boards")
        .and(warp::post())
        .and(warp::body::json())
        .and(session_filter.clone())
        .and_then(handle_create_board);

    // Open a board through a share reference (fetch + reconcile once)
    let board_state = warp::path!("board" / Uuid / "state")
        .and(warp::get())
        .and(warp::query::<TokenQuery>())
        .and(session_filter.clone())
        .and_then(handle_board_state);

    // Derived leaderboard for a board
    let standings = warp::path!("board" / Uuid / "standings")
        .and(warp::get())
        .and(session_filter.clone())
        .and_then(handle_standings);

    // Locally-originated edits
    let commands = warp::path!("board" / Uuid / "commands")
        .and(warp::post())
        .and(warp::query::<TokenQuery>())
        .and(warp::body::json())
        .and(session_filter.clone())
        .and_then(handle_command);

    // Photo upload: raw image bytes, bounded and inlined server-side
    let photo_upload = warp::path!("board" / Uuid / "players" / Uuid / "photo")
        .and(warp::post())
        .and(warp::body::content_length_limit(8 * 1024 * 1024))
        .and(warp::body::bytes())
        .and(session_filter.clone())
        .and(config_filter.clone())
        .and_then(handle_photo_upload);

    // Share references for a board; the manage link needs edit rights
    let share_links = warp::path!("board" / Uuid / "share")
        .and(warp::get())
        .and(warp::query::<TokenQuery>())
        .and(session_filter.clone())
        .and_then(handle_share_links);

    // Bulk export of the whole profile aggregate
    let export_root = warp::path("export")
        .and(warp::get())
        .and(session_filter.clone())
        .and_then(handle_export_root);

    // Export one board for sharing out of band
    let export_board = warp::path!("board" / Uuid / "export")
        .and(warp::get())
        .and(session_filter.clone())
        .and_then(handle_export_board);

    // Bulk import: wholesale replacement of the root aggregate
    let import_root = warp::path("import")
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024 * 1024))
        .and(warp::body::bytes())
        .and(session_filter.clone())
        .and_then(handle_import_root);

    // Live snapshot channel, one per board
    let board_socket = warp::path!("ws" / "board" / Uuid)
        .and(warp::ws())
        .and(session_filter.clone())
        .and(hub_filter.clone())
        .map(|board_id: Uuid, ws: warp::ws::Ws, session, hub| {
            ws.on_upgrade(move |socket| ws::handle_board_socket(socket, board_id, session, hub))
        });

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(create_board)
        .or(board_state)
        .or(standings)
        .or(commands)
        .or(photo_upload)
        .or(share_links)
        .or(export_root)
        .or(export_board)
        .or(import_root)
        .or(board_socket)
        .with(cors)
        .with(warp::log("tally"))
}

async fn handle_create_board(
    request: CreateBoardRequest,
    session: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let board = session.create_board(&request.name).await;
    Ok(warp::reply::with_status(
        warp::reply::json(&board),
        StatusCode::CREATED,
    ))
}

async fn handle_board_state(
    board_id: Uuid,
    query: TokenQuery,
    session: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match session
        .open_shared_board(board_id, query.token.as_deref())
        .await
    {
        Ok(opened) => Ok(warp::reply::with_status(
            warp::reply::json(&opened),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(&error)),
    }
}

async fn handle_standings(
    board_id: Uuid,
    session: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match session.standings(board_id).await {
        Ok(rows) => Ok(warp::reply::with_status(
            warp::reply::json(&rows),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(&error)),
    }
}

async fn handle_command(
    board_id: Uuid,
    query: TokenQuery,
    command: BoardCommand,
    session: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match session
        .apply_command(board_id, query.token.as_deref(), command)
        .await
    {
        Ok(board) => Ok(warp::reply::with_status(
            warp::reply::json(&board),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(&error)),
    }
}

async fn handle_photo_upload(
    board_id: Uuid,
    player_id: Uuid,
    bytes: bytes::Bytes,
    session: Arc<SessionManager>,
    config: Config,
) -> Result<impl warp::Reply, warp::Rejection> {
    match session
        .attach_photo(
            board_id,
            player_id,
            &bytes,
            config.photo_max_dimension,
            config.photo_jpeg_quality,
        )
        .await
    {
        Ok(board) => Ok(warp::reply::with_status(
            warp::reply::json(&board),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(&error)),
    }
}

async fn handle_share_links(
    board_id: Uuid,
    query: TokenQuery,
    session: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let root = session.root_snapshot().await;
    match root.find_board(board_id) {
        Some(board) => {
            let can_edit =
                tally_core::can_edit(board, root.current_user.id, query.token.as_deref());
            let response = ShareLinksResponse {
                view: ShareLink::view(board).to_reference(),
                manage: can_edit.then(|| ShareLink::manage(board).to_reference()),
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&response),
                StatusCode::OK,
            ))
        }
        None => Ok(error_reply(&ServiceError::BoardNotFound(board_id))),
    }
}

async fn handle_export_root(
    session: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let payload = session.export_root().await;
    Ok(warp::reply::with_header(
        payload,
        "content-type",
        "application/json",
    ))
}

async fn handle_export_board(
    board_id: Uuid,
    session: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match session.export_board(board_id).await {
        Ok(payload) => Ok(warp::reply::with_status(
            warp::reply::with_header(payload, "content-type", "application/json"),
            StatusCode::OK,
        )),
        Err(error) => {
            let body = serde_json::json!({ "error": error.to_string() }).to_string();
            Ok(warp::reply::with_status(
                warp::reply::with_header(body, "content-type", "application/json"),
                error_status(&error),
            ))
        }
    }
}

async fn handle_import_root(
    bytes: bytes::Bytes,
    session: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let payload = match std::str::from_utf8(&bytes) {
        Ok(payload) => payload,
        Err(_) => {
            let error = ServiceError::ImportFailed("payload is not valid UTF-8".to_string());
            return Ok(error_reply(&error));
        }
    };

    match session.import_root(payload).await {
        Ok(root) => Ok(warp::reply::with_status(
            warp::reply::json(&root),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(&error)),
    }
}
