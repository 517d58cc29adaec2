// Wire protocol DTOs and conversions for public session server messages.

use crate::domain::{Point, ResolvedAction};
use crate::use_cases::{GameStatus, SessionSnapshot};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Confirms which player this connection acts as.
    Identity { player_id: String },
    // Periodic full session snapshot, including the cumulative action log.
    Snapshot(SessionSnapshotDto),
    // Intake/validation failure, reported only to the offending connection.
    Error { error: String },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake binding the connection to a player identity.
    Join(JoinPayload),
    // Host request to start the session once both players are in.
    Start,
    // Buffer a repositioning intent for the current turn.
    Move(PointDto),
    // Buffer a shot at the opponent's platform.
    Shoot(PointDto),
}

/// Payload for the Join handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointDto {
    pub x: i32,
    pub y: i32,
}

impl From<Point> for PointDto {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PointDto> for Point {
    fn from(p: PointDto) -> Self {
        Point::new(p.x, p.y)
    }
}

/// Session lifecycle state for client UI flow.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum GameStatusDto {
    WaitingForPlayer2,
    NotStarted,
    Running,
    Over,
}

impl From<GameStatus> for GameStatusDto {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::WaitingForPlayer2 => GameStatusDto::WaitingForPlayer2,
            GameStatus::NotStarted => GameStatusDto::NotStarted,
            GameStatus::Running => GameStatusDto::Running,
            GameStatus::Over => GameStatusDto::Over,
        }
    }
}

/// One entry of the resolution history. `player` is the slot (1 or 2) and
/// `type` the numeric action code, so consumers can deduplicate entries by
/// (turn, player, type) across retransmissions.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedActionDto {
    pub turn: u64,
    pub player: u8,
    #[serde(rename = "type")]
    pub action_type: u8,
    pub value: PointDto,
}

impl From<&ResolvedAction> for ResolvedActionDto {
    fn from(action: &ResolvedAction) -> Self {
        Self {
            turn: action.turn,
            player: action.player_slot,
            action_type: action.kind.wire_code(),
            value: action.target.into(),
        }
    }
}

/// Full session snapshot published on a fixed cadence. Carries the whole
/// cumulative action history each time; every publication is a complete
/// resync on its own.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshotDto {
    pub turn: u64,
    pub turn_time_running: u64,
    pub status: GameStatusDto,
    pub platform1: Vec<Vec<bool>>,
    pub platform2: Vec<Vec<bool>>,
    pub player1_position: Option<PointDto>,
    pub player2_position: Option<PointDto>,
    pub player1_is_alive: bool,
    pub player2_is_alive: bool,
    pub actions_history: Vec<ResolvedActionDto>,
}

impl SessionSnapshotDto {
    pub fn build(
        snapshot: &SessionSnapshot,
        elapsed_turn_time: Duration,
        history: &[ResolvedAction],
    ) -> Self {
        Self {
            turn: snapshot.turn,
            turn_time_running: elapsed_turn_time.as_millis() as u64,
            status: snapshot.status.into(),
            platform1: snapshot.platform1.clone(),
            platform2: snapshot.platform2.clone(),
            player1_position: snapshot.position1.map(PointDto::from),
            player2_position: snapshot.position2.map(PointDto::from),
            player1_is_alive: snapshot.player1.is_alive(),
            player2_is_alive: snapshot
                .player2
                .as_ref()
                .is_none_or(|player| player.is_alive()),
            actions_history: history.iter().map(ResolvedActionDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActionKind;

    #[test]
    fn resolved_actions_use_numeric_wire_codes() {
        let action = ResolvedAction {
            turn: 3,
            player_slot: 2,
            kind: ActionKind::Shoot,
            target: Point::new(1, 4),
        };
        let dto = ResolvedActionDto::from(&action);
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["turn"], 3);
        assert_eq!(json["player"], 2);
        assert_eq!(json["type"], 1);
        assert_eq!(json["value"]["x"], 1);
        assert_eq!(json["value"]["y"], 4);
    }

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"Move","data":{"x":1,"y":2}}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Move(PointDto { x: 1, y: 2 })));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"Join","data":{"player_id":"p1","player_name":"Ahab"}}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::Join(_)));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"Start"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Start));
    }
}
