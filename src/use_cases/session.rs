// Authoritative per-match state machine. Synchronous on purpose: the owning
// handle serializes access with one mutex per session, so every mutation of
// buffers, positions, platforms and the resolved log happens in a single
// logical thread of control.

use crate::domain::{
    ActionKind, Pathfinder, PendingActions, Platform, Player, Point, ResolvedAction, SessionError,
};
use std::time::Duration;
use tracing::warn;

pub const PLATFORM_WIDTH: i32 = 3;
pub const PLATFORM_HEIGHT: i32 = 5;
pub const PLAYER1_SPAWN: Point = Point { x: 0, y: 4 };
pub const PLAYER2_SPAWN: Point = Point { x: 2, y: 4 };

/// Session lifecycle. `Over` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    WaitingForPlayer2,
    NotStarted,
    Running,
    Over,
}

/// Defensive copy of observable session state; safe to retain.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub turn: u64,
    pub status: GameStatus,
    pub platform1: Vec<Vec<bool>>,
    pub platform2: Vec<Vec<bool>>,
    pub position1: Option<Point>,
    pub position2: Option<Point>,
    pub player1: Player,
    pub player2: Option<Player>,
}

#[derive(Debug)]
pub struct Session {
    id: String,
    name: String,
    turn_duration: Duration,
    status: GameStatus,
    turn: u64,
    pathfinder: Pathfinder,
    player1: Player,
    player2: Option<Player>,
    platform1: Platform,
    platform2: Platform,
    position1: Option<Point>,
    position2: Option<Point>,
    pending1: PendingActions,
    pending2: PendingActions,
    resolved: Vec<ResolvedAction>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        player1: Player,
        turn_duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            turn_duration,
            status: GameStatus::WaitingForPlayer2,
            turn: 1,
            pathfinder: Pathfinder::new(),
            player1,
            player2: None,
            platform1: Platform::new(PLATFORM_WIDTH, PLATFORM_HEIGHT),
            platform2: Platform::new(PLATFORM_WIDTH, PLATFORM_HEIGHT),
            position1: None,
            position2: None,
            pending1: PendingActions::default(),
            pending2: PendingActions::default(),
            resolved: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn turn_duration(&self) -> Duration {
        self.turn_duration
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn player_ids(&self) -> (String, Option<String>) {
        (
            self.player1.id().to_string(),
            self.player2.as_ref().map(|p| p.id().to_string()),
        )
    }

    /// Attaches the second player. Valid only before the session is running;
    /// later calls are ignored.
    pub fn set_player2(&mut self, player2: Player) {
        match self.status {
            GameStatus::WaitingForPlayer2 | GameStatus::NotStarted => {
                self.player2 = Some(player2);
                self.status = GameStatus::NotStarted;
            }
            GameStatus::Running | GameStatus::Over => {
                warn!(session_id = %self.id, "ignoring player2 attach on a started session");
            }
        }
    }

    /// Places both players at their spawn tiles and opens the first turn.
    /// The owning handle starts the turn scheduler after this succeeds.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if matches!(self.status, GameStatus::Running | GameStatus::Over) {
            return Err(SessionError::SessionAlreadyStarted(self.id.clone()));
        }
        if self.player2.is_none() {
            return Err(SessionError::MissingParticipant);
        }
        self.position1 = Some(PLAYER1_SPAWN);
        self.position2 = Some(PLAYER2_SPAWN);
        self.pending1.clear();
        self.pending2.clear();
        self.status = GameStatus::Running;
        Ok(())
    }

    /// Buffers an intent for the current turn. Validation happens here, at
    /// submission time only; resolution later applies buffered actions
    /// blindly. A second action of the same kind overwrites the first.
    pub fn add_action(
        &mut self,
        player_id: &str,
        kind: ActionKind,
        target: Point,
    ) -> Result<(), SessionError> {
        let slot = self
            .slot_of(player_id)
            .ok_or_else(|| SessionError::UnknownParticipant(player_id.to_string()))?;

        if self.status != GameStatus::Running {
            return Err(SessionError::InvalidAction {
                kind,
                reason: "session is not running".to_string(),
            });
        }

        let own_platform = match slot {
            1 => &self.platform1,
            _ => &self.platform2,
        };

        // Out-of-range targets are dropped silently to tolerate minor
        // client/server coordinate-mapping drift.
        if !own_platform.is_within_range(target) {
            return Ok(());
        }

        if kind == ActionKind::Move {
            let current = match slot {
                1 => self.position1,
                _ => self.position2,
            }
            .ok_or(SessionError::MissingParticipant)?;
            if !self.pathfinder.is_path_available(own_platform, current, target) {
                return Err(SessionError::InvalidAction {
                    kind,
                    reason: "path not available".to_string(),
                });
            }
        }

        match slot {
            1 => self.pending1.store(kind, target),
            _ => self.pending2.store(kind, target),
        }
        Ok(())
    }

    /// Drains both players' buffered actions in fixed order (player1 then
    /// player2, Move then Shoot), applies the effects, appends log entries
    /// tagged with the turn the actions were submitted during, then runs the
    /// death check. No-op once the session is over.
    pub fn advance_turn(&mut self) -> Result<(), SessionError> {
        if self.status == GameStatus::Over {
            return Ok(());
        }

        self.turn += 1;
        let submitted_turn = self.turn - 1;

        for slot in [1u8, 2u8] {
            for kind in ActionKind::RESOLUTION_ORDER {
                let target = match slot {
                    1 => self.pending1.get(kind),
                    _ => self.pending2.get(kind),
                };
                let Some(target) = target else {
                    continue;
                };

                match kind {
                    ActionKind::Move => match slot {
                        1 => self.position1 = Some(target),
                        _ => self.position2 = Some(target),
                    },
                    ActionKind::Shoot => {
                        let enemy_platform = match slot {
                            1 => &mut self.platform2,
                            _ => &mut self.platform1,
                        };
                        enemy_platform.destroy_tile(target)?;
                    }
                }

                self.resolved.push(ResolvedAction {
                    turn: submitted_turn,
                    player_slot: slot,
                    kind,
                    target,
                });
            }
        }

        self.pending1.clear();
        self.pending2.clear();

        // A player standing on a destroyed tile of their own platform sinks.
        if let Some(position) = self.position1 {
            if !self.platform1.is_tile_present(position)? {
                self.player1.sink();
            }
        }
        if let Some(position) = self.position2 {
            if let Some(player2) = self.player2.as_mut() {
                if !self.platform2.is_tile_present(position)? {
                    player2.sink();
                }
            }
        }

        if !self.player1.is_alive() || self.player2.as_ref().is_some_and(|p| !p.is_alive()) {
            self.status = GameStatus::Over;
        }

        Ok(())
    }

    /// The platform belonging to whichever player the given id is not.
    pub fn enemy_platform(&self, player_id: &str) -> Option<&Platform> {
        match self.slot_of(player_id)? {
            1 => Some(&self.platform2),
            _ => Some(&self.platform1),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            turn: self.turn,
            status: self.status,
            platform1: self.platform1.tiles(),
            platform2: self.platform2.tiles(),
            position1: self.position1,
            position2: self.position2,
            player1: self.player1.clone(),
            player2: self.player2.clone(),
        }
    }

    /// Cumulative resolution history since start, in application order.
    pub fn resolved_actions(&self) -> &[ResolvedAction] {
        &self.resolved
    }

    fn slot_of(&self, player_id: &str) -> Option<u8> {
        if self.player1.id() == player_id {
            Some(1)
        } else if self.player2.as_ref().is_some_and(|p| p.id() == player_id) {
            Some(2)
        } else {
            None
        }
    }
}
