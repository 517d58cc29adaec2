use crate::domain::point::Point;
use serde::{Deserialize, Serialize};

/// The two intents a player can buffer for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    Shoot,
}

impl ActionKind {
    /// Fixed kind order used during resolution. An explicit ordered array,
    /// not a map, so iteration is deterministic across platforms.
    pub const RESOLUTION_ORDER: [ActionKind; 2] = [ActionKind::Move, ActionKind::Shoot];

    /// Numeric code used on the wire for resolved-action history entries.
    pub fn wire_code(self) -> u8 {
        match self {
            ActionKind::Move => 0,
            ActionKind::Shoot => 1,
        }
    }

    /// Inverse of [`wire_code`](Self::wire_code). An unknown code means a
    /// protocol/version mismatch between peer and server.
    pub fn from_wire(code: u8) -> Result<Self, crate::domain::errors::SessionError> {
        match code {
            0 => Ok(ActionKind::Move),
            1 => Ok(ActionKind::Shoot),
            _ => Err(crate::domain::errors::SessionError::UnsupportedActionKind),
        }
    }
}

/// Per-player buffer of not-yet-resolved intents: at most one Move and one
/// Shoot per turn. Storing a second action of the same kind overwrites the
/// first (latest-wins, no history of overwritten intents).
#[derive(Debug, Clone, Default)]
pub struct PendingActions {
    move_target: Option<Point>,
    shoot_target: Option<Point>,
}

impl PendingActions {
    pub fn store(&mut self, kind: ActionKind, target: Point) {
        match kind {
            ActionKind::Move => self.move_target = Some(target),
            ActionKind::Shoot => self.shoot_target = Some(target),
        }
    }

    pub fn get(&self, kind: ActionKind) -> Option<Point> {
        match kind {
            ActionKind::Move => self.move_target,
            ActionKind::Shoot => self.shoot_target,
        }
    }

    pub fn clear(&mut self) {
        self.move_target = None;
        self.shoot_target = None;
    }
}

/// Immutable entry in the cumulative resolution log. `turn` is the turn the
/// action was submitted during; `player_slot` is 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAction {
    pub turn: u64,
    pub player_slot: u8,
    pub kind: ActionKind,
    pub target: Point,
}
