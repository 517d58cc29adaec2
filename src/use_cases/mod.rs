// Use cases layer: session orchestration, scheduling and the registry.

pub mod registry;
pub mod scheduler;
pub mod session;

pub use registry::{SessionHandle, SessionRegistry, SessionSettings};
pub use scheduler::TurnScheduler;
pub use session::{GameStatus, Session, SessionSnapshot};
