// Session registry: room bookkeeping plus the thin action-intake wrappers
// the transport calls. Owns one handle per live session.

use crate::domain::{ActionKind, Player, Point, SessionError};
use crate::use_cases::scheduler::TurnScheduler;
use crate::use_cases::session::{GameStatus, Session, SessionSnapshot};
use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info};

/// Shared configuration applied to newly created sessions.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Wall-clock length of one turn.
    pub turn_duration: Duration,
    /// Cadence of snapshot publication to clients.
    pub snapshot_interval: Duration,
    /// Capacity for broadcast snapshot bytes.
    pub snapshot_broadcast_capacity: usize,
}

/// Per-session shared state handed to transports. All mutation of the
/// session goes through the single mutex; the scheduler callback and any
/// caller-driven submission serialize on it.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    pub session_id: Arc<str>,
    session: Arc<Mutex<Session>>,
    scheduler: Arc<Mutex<TurnScheduler>>,
    /// Broadcast sender for serialized session snapshots.
    pub snapshot_tx: broadcast::Sender<Utf8Bytes>,
}

fn unpoisoned<'a, T>(
    result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    // A panicking turn callback must not wedge the whole session.
    result.unwrap_or_else(PoisonError::into_inner)
}

impl SessionHandle {
    pub fn lock_session(&self) -> MutexGuard<'_, Session> {
        unpoisoned(self.session.lock())
    }

    /// Time since the turn last advanced; zero before the session starts.
    pub fn elapsed_turn_time(&self) -> Duration {
        unpoisoned(self.scheduler.lock()).elapsed()
    }

    pub fn is_scheduler_running(&self) -> bool {
        unpoisoned(self.scheduler.lock()).is_running()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_session().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Utf8Bytes> {
        self.snapshot_tx.subscribe()
    }

    fn start_scheduler(&self) {
        let session = Arc::clone(&self.session);
        let session_id = self.session_id.clone();
        unpoisoned(self.scheduler.lock()).start(move || {
            let mut session = unpoisoned(session.lock());
            session.advance_turn().inspect_err(|e| {
                // Programming-error class: the session is unhealthy from here.
                error!(session_id = %session_id, error = %e, "turn resolution failed");
            })
        });
    }

    fn stop_scheduler(&self) {
        unpoisoned(self.scheduler.lock()).stop();
    }
}

/// Thread-safe registry of active sessions.
pub struct SessionRegistry {
    settings: SessionSettings,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub async fn session_exists(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn get_session(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Creates a session with the host as player1. The session waits for a
    /// second player before it can start.
    pub async fn create_session(
        &self,
        session_id: String,
        host_id: &str,
        host_name: &str,
    ) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session_id) {
            return Err(SessionError::SessionAlreadyExists(session_id));
        }

        let session = Session::new(
            session_id.clone(),
            session_id.clone(),
            Player::new(host_id, host_name),
            self.settings.turn_duration,
        );
        let (snapshot_tx, _snapshot_rx) =
            broadcast::channel::<Utf8Bytes>(self.settings.snapshot_broadcast_capacity);

        let handle = SessionHandle {
            session_id: Arc::from(session_id.as_str()),
            session: Arc::new(Mutex::new(session)),
            scheduler: Arc::new(Mutex::new(TurnScheduler::new(self.settings.turn_duration))),
            snapshot_tx,
        };

        info!(session_id = %session_id, host_id, "session created");
        sessions.insert(session_id, handle.clone());
        Ok(handle)
    }

    /// Attaches the guest as player2.
    pub async fn join_session(
        &self,
        session_id: &str,
        guest_id: &str,
        guest_name: &str,
    ) -> Result<SessionHandle, SessionError> {
        let handle = self
            .get_session(session_id)
            .await
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))?;

        {
            let mut session = handle.lock_session();
            let (host_id, guest) = session.player_ids();
            if guest.is_some() || host_id == guest_id {
                return Err(SessionError::SessionFull(session_id.to_string()));
            }
            session.set_player2(Player::new(guest_id, guest_name));
        }

        info!(session_id, guest_id, "player joined session");
        Ok(handle)
    }

    /// The matchmaking `getRoom` view: host and optional guest ids.
    pub async fn player_ids(
        &self,
        session_id: &str,
    ) -> Result<(String, Option<String>), SessionError> {
        let handle = self
            .get_session(session_id)
            .await
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))?;
        let ids = handle.lock_session().player_ids();
        Ok(ids)
    }

    /// Starts the session and its turn scheduler.
    pub async fn start_session(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        let handle = self
            .get_session(session_id)
            .await
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))?;

        handle.lock_session().start()?;
        handle.start_scheduler();
        info!(session_id, "session started");
        Ok(handle)
    }

    /// Action intake: buffer a repositioning intent for the current turn.
    pub async fn submit_move(
        &self,
        session_id: &str,
        actor_id: &str,
        target: Point,
    ) -> Result<(), SessionError> {
        self.submit_action(session_id, actor_id, ActionKind::Move, target)
            .await
    }

    /// Action intake: buffer a shot at the opponent's platform.
    pub async fn submit_shoot(
        &self,
        session_id: &str,
        actor_id: &str,
        target: Point,
    ) -> Result<(), SessionError> {
        self.submit_action(session_id, actor_id, ActionKind::Shoot, target)
            .await
    }

    async fn submit_action(
        &self,
        session_id: &str,
        actor_id: &str,
        kind: ActionKind,
        target: Point,
    ) -> Result<(), SessionError> {
        let handle = self
            .get_session(session_id)
            .await
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))?;
        handle.lock_session().add_action(actor_id, kind, target)
    }

    /// Stops the scheduler and removes the session. Teardown is driven from
    /// here, never from turn resolution itself.
    pub async fn remove_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(handle) => {
                handle.stop_scheduler();
                info!(session_id, "session removed");
                true
            }
            None => false,
        }
    }

    /// Whether the session has reached its terminal state.
    pub async fn is_over(&self, session_id: &str) -> bool {
        match self.get_session(session_id).await {
            Some(handle) => handle.lock_session().status() == GameStatus::Over,
            None => true,
        }
    }
}
