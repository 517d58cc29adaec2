use crate::domain::SessionError;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, SessionSnapshotDto};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameStatus, SessionHandle, SessionRegistry};

use axum::{
    Error, Json,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::sink::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    SnapshotsClosed,
    JoinRequired,
    JoinTimeout,
    JoinRejected,
    ClosedBeforeJoin,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_PLAYER_ID_LEN: usize = 128;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, serde::Deserialize)]
pub struct SessionQuery {
    // The session id the client wants to attach to.
    session_id: String,
}

/// Publishes a serialized snapshot of the session on a fixed cadence until
/// the session is over. Serializes once per tick; all connections receive
/// the shared bytes. Because each snapshot carries the full cumulative
/// history, a dropped publication is recovered by the next one.
pub fn spawn_snapshot_publisher(handle: &SessionHandle, interval: Duration) {
    let handle = handle.clone();
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            timer.tick().await;

            let elapsed = handle.elapsed_turn_time();
            let (snapshot, history) = {
                let session = handle.lock_session();
                (session.snapshot(), session.resolved_actions().to_vec())
            };
            // Teardown is registry-driven; a stopped scheduler means the
            // session was removed and this publisher should wind down too.
            let over = snapshot.status == GameStatus::Over || !handle.is_scheduler_running();

            let msg = ServerMessage::Snapshot(SessionSnapshotDto::build(
                &snapshot, elapsed, &history,
            ));
            match serde_json::to_string(&msg) {
                Ok(txt) => {
                    // No receivers is fine; clients may not have attached yet.
                    let _ = handle.snapshot_tx.send(Utf8Bytes::from(txt));
                }
                Err(e) => {
                    error!(session_id = %handle.session_id, error = ?e, "failed to serialize snapshot");
                }
            }

            if over {
                info!(session_id = %handle.session_id, "session over; snapshot publisher exiting");
                break;
            }
        }
    });
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> impl IntoResponse {
    let handle = match state.session_registry.get_session(&query.session_id).await {
        Some(handle) => handle,
        None => {
            // Keep not-found responses consistent with the JSON error schema.
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("session not found")),
            )
                .into_response();
        }
    };

    let registry = state.session_registry.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, handle, registry))
}

async fn handle_socket(mut socket: WebSocket, handle: SessionHandle, registry: Arc<SessionRegistry>) {
    let span = info_span!("conn", session_id = %handle.session_id, player_id = tracing::field::Empty);

    async move {
        let player_id = match bootstrap_connection(&mut socket, &handle, &registry).await {
            Ok(player_id) => player_id,
            Err(NetError::ClosedBeforeJoin) => {
                info!("client disconnected before join handshake");
                return;
            }
            Err(e) => {
                warn!(error = ?e, "failed to bootstrap connection");
                return;
            }
        };

        tracing::Span::current().record("player_id", player_id.as_str());
        info!(player_id = %player_id, "client connected");

        if let Err(e) = run_client_loop(&mut socket, &handle, &registry, &player_id).await {
            warn!(error = ?e, "client loop exited with error");
        }
        info!(player_id = %player_id, "client disconnected");
    }
    .instrument(span)
    .await
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

/// Reads the Join handshake, binds the connection to a player slot (joining
/// as player2 when the id is new and a seat is free) and confirms identity.
async fn bootstrap_connection(
    socket: &mut WebSocket,
    handle: &SessionHandle,
    registry: &Arc<SessionRegistry>,
) -> Result<String, NetError> {
    let join = match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(socket)).await {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(socket, close_code::POLICY, "join timeout").await;
            return Err(NetError::JoinTimeout);
        }
    };

    let already_seated = {
        let session = handle.lock_session();
        let (host_id, guest_id) = session.player_ids();
        host_id == join.player_id || guest_id.as_deref() == Some(join.player_id.as_str())
    };

    if !already_seated {
        let player_name = if join.player_name.is_empty() {
            join.player_id.clone()
        } else {
            join.player_name.clone()
        };
        match registry
            .join_session(&handle.session_id, &join.player_id, &player_name)
            .await
        {
            Ok(_) => {}
            Err(SessionError::SessionFull(_)) => {
                let _ = send_close_with_reason(socket, close_code::POLICY, "session full").await;
                return Err(NetError::JoinRejected);
            }
            Err(e) => {
                warn!(error = %e, "join rejected");
                let _ = send_close_with_reason(socket, close_code::POLICY, "join rejected").await;
                return Err(NetError::JoinRejected);
            }
        }
    }

    let identity = ServerMessage::Identity {
        player_id: join.player_id.clone(),
    };
    send_message(socket, &identity).await?;

    Ok(join.player_id)
}

struct JoinHandshake {
    player_id: String,
    player_name: String,
}

async fn read_join_handshake(socket: &mut WebSocket) -> Result<JoinHandshake, NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        let message = incoming.map_err(NetError::Ws)?;
        match message {
            Message::Text(text) => {
                let payload = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => payload,
                    Ok(_) => {
                        let _ = send_close_with_reason(socket, close_code::POLICY, "join required")
                            .await;
                        return Err(NetError::JoinRequired);
                    }
                    Err(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "invalid join payload",
                        )
                        .await;
                        return Err(NetError::JoinRequired);
                    }
                };

                let player_id = payload.player_id.trim();
                if player_id.is_empty() || player_id.len() > MAX_PLAYER_ID_LEN {
                    let _ =
                        send_close_with_reason(socket, close_code::POLICY, "invalid player id")
                            .await;
                    return Err(NetError::JoinRequired);
                }

                return Ok(JoinHandshake {
                    player_id: player_id.to_string(),
                    player_name: payload.player_name.trim().to_string(),
                });
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn run_client_loop(
    socket: &mut WebSocket,
    handle: &SessionHandle,
    registry: &Arc<SessionRegistry>,
    player_id: &str,
) -> Result<(), NetError> {
    let mut snapshot_rx = handle.subscribe();
    let mut invalid_json: u32 = 0;
    let mut last_lag_log = Instant::now() - LOG_THROTTLE;
    let mut last_invalid_log = Instant::now() - LOG_THROTTLE;
    let mut close_frame: Option<CloseFrame> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    socket,
                    incoming,
                    handle,
                    registry,
                    player_id,
                    &mut invalid_json,
                    &mut last_invalid_log,
                    &mut close_frame,
                ).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => return Err(e),
                }
            }

            snapshot = snapshot_rx.recv() => {
                match snapshot {
                    Ok(bytes) => {
                        match socket.send(Message::Text(bytes)).await {
                            Ok(()) => false,
                            Err(e) => {
                                warn!(error = ?e, "failed to send snapshot");
                                true
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Each snapshot is a full resync, so skipping ahead
                        // loses nothing that the next publication won't carry.
                        if should_log(&mut last_lag_log) {
                            warn!(missed = n, "snapshot stream lagged; awaiting next publication");
                        }
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(NetError::SnapshotsClosed);
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            return Ok(());
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_incoming_ws(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, Error>>,
    handle: &SessionHandle,
    registry: &Arc<SessionRegistry>,
    player_id: &str,
    invalid_json: &mut u32,
    last_invalid_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Join(_)) => {
                    // Ignore repeated Join packets after bootstrap.
                    if should_log(last_invalid_log) {
                        warn!(player_id, "duplicate join ignored");
                    }
                    Ok(LoopControl::Continue)
                }
                Ok(ClientMessage::Start) => {
                    match registry.start_session(&handle.session_id).await {
                        Ok(started) => {
                            spawn_snapshot_publisher(
                                &started,
                                registry.settings().snapshot_interval,
                            );
                            Ok(LoopControl::Continue)
                        }
                        Err(e) => report_intake_error(socket, player_id, e).await,
                    }
                }
                Ok(ClientMessage::Move(target)) => {
                    debug!(player_id, x = target.x, y = target.y, "move submitted");
                    match registry
                        .submit_move(&handle.session_id, player_id, target.into())
                        .await
                    {
                        Ok(()) => Ok(LoopControl::Continue),
                        Err(e) => report_intake_error(socket, player_id, e).await,
                    }
                }
                Ok(ClientMessage::Shoot(target)) => {
                    debug!(player_id, x = target.x, y = target.y, "shot submitted");
                    match registry
                        .submit_shoot(&handle.session_id, player_id, target.into())
                        .await
                    {
                        Ok(()) => Ok(LoopControl::Continue),
                        Err(e) => report_intake_error(socket, player_id, e).await,
                    }
                }
                Err(parse_err) => {
                    *invalid_json += 1;
                    if should_log(last_invalid_log) {
                        warn!(
                            player_id,
                            bytes = text.len(),
                            error = %parse_err,
                            "failed to parse client message"
                        );
                    }

                    if *invalid_json > MAX_INVALID_JSON {
                        *close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too many invalid messages".into(),
                        });
                        return Ok(LoopControl::Disconnect);
                    }

                    Ok(LoopControl::Continue)
                }
            },
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

/// Intake failures are reported to the offending connection only; they are
/// never broadcast and never fatal to the session.
async fn report_intake_error(
    socket: &mut WebSocket,
    player_id: &str,
    e: SessionError,
) -> Result<LoopControl, NetError> {
    debug!(player_id, error = %e, "action rejected");
    let msg = ServerMessage::Error {
        error: e.to_string(),
    };
    send_message(socket, &msg).await?;
    Ok(LoopControl::Continue)
}
