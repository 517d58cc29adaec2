// Domain layer: boards, players, actions and the rules that bind them.

pub mod action;
pub mod errors;
pub mod pathfinder;
pub mod platform;
pub mod player;
pub mod point;

pub use action::{ActionKind, PendingActions, ResolvedAction};
pub use errors::SessionError;
pub use pathfinder::Pathfinder;
pub use platform::Platform;
pub use player::Player;
pub use point::Point;
