pub mod encode;
pub mod game;
pub mod hud;
pub mod net;

use crate::identity::IdentityStore;
use crate::protocol::{GameId, PlayerId};
use anyhow::Context;
use url::Url;

use encode::{Intent, encode_intent};
use game::{Phase, PhaseMachine};
use net::{ConnectionEvent, ConnectionHandle};

/// Connection health as seen by the player. Kept apart from [`Phase`] since
/// the server never pushes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Open,
    /// Failed to open, or failed after opening.
    Problem(String),
    Disconnected(Option<String>),
}

impl LinkStatus {
    pub fn is_down(&self) -> bool {
        matches!(self, LinkStatus::Problem(_) | LinkStatus::Disconnected(_))
    }
}

/// What changed after one call to [`Session::next_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The socket opened and the access action went out.
    Connected,
    PhaseChanged,
    ConnectionProblem(String),
    Disconnected(Option<String>),
}

/// Drives one game view: owns the connection, the current phase and the
/// player identity used on every action.
#[derive(Debug)]
pub struct Session {
    game_id: GameId,
    player_id: PlayerId,
    connection: ConnectionHandle,
    phase: PhaseMachine,
    link: LinkStatus,
    access_sent: bool,
}

impl Session {
    /// Resolve the player identity and start connecting. The access action
    /// is sent from [`Session::next_update`] once the socket is open.
    pub fn activate<S: IdentityStore + ?Sized>(
        endpoint: &Url,
        game_id: GameId,
        identity: &mut S,
    ) -> anyhow::Result<Self> {
        let player_id = identity
            .get_or_create()
            .context("failed resolving player identity")?;
        log::info!("game {}: activating session for player {}", game_id, player_id);

        Ok(Self {
            game_id,
            player_id,
            connection: ConnectionHandle::open(endpoint),
            phase: PhaseMachine::new(),
            link: LinkStatus::Connecting,
            access_sent: false,
        })
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn phase(&self) -> &Phase {
        self.phase.current()
    }

    pub fn link(&self) -> &LinkStatus {
        &self.link
    }

    /// Handle the next connection event. Returns `None` once the connection
    /// has ended and nothing is left to process. Cancel-safe.
    pub async fn next_update(&mut self) -> Option<SessionEvent> {
        let event = self.connection.next_event().await?;
        Some(self.handle_event(event))
    }

    fn handle_event(&mut self, event: ConnectionEvent) -> SessionEvent {
        match event {
            ConnectionEvent::Opened => {
                self.link = LinkStatus::Open;
                if let Err(err) = self.send_access() {
                    log::warn!("game {}: failed sending access: {:#}", self.game_id, err);
                    self.link = LinkStatus::Problem(err.to_string());
                    return SessionEvent::ConnectionProblem(err.to_string());
                }
                SessionEvent::Connected
            }
            ConnectionEvent::Text(raw) => {
                let phase = self.phase.apply(&raw);
                log::debug!("game {}: now in phase {}", self.game_id, phase.name());
                SessionEvent::PhaseChanged
            }
            ConnectionEvent::Errored(reason) => {
                log::warn!("game {}: connection problem: {}", self.game_id, reason);
                self.link = LinkStatus::Problem(reason.clone());
                SessionEvent::ConnectionProblem(reason)
            }
            ConnectionEvent::Closed(reason) => {
                log::info!("game {}: connection closed ({:?})", self.game_id, reason);
                self.link = LinkStatus::Disconnected(reason.clone());
                SessionEvent::Disconnected(reason)
            }
        }
    }

    fn send_access(&mut self) -> anyhow::Result<()> {
        if self.access_sent {
            return Ok(());
        }
        self.send_intent(Intent::Access)?;
        self.access_sent = true;
        Ok(())
    }

    pub fn submit_join(&mut self, name: &str, avatar: &str) -> anyhow::Result<()> {
        self.send_intent(Intent::Join {
            name: name.to_string(),
            avatar: avatar.to_string(),
        })
    }

    pub fn start_game(&mut self) -> anyhow::Result<()> {
        self.send_intent(Intent::StartGame)
    }

    pub fn submit_drawing(&mut self, image: Vec<u8>) -> anyhow::Result<()> {
        self.send_intent(Intent::SubmitDrawing(image))
    }

    pub fn submit_guess(&mut self, text: &str) -> anyhow::Result<()> {
        self.send_intent(Intent::SubmitGuess(text.to_string()))
    }

    fn send_intent(&mut self, intent: Intent) -> anyhow::Result<()> {
        let label = intent.label();
        let frame = encode_intent(intent, &self.game_id, &self.player_id)
            .with_context(|| format!("failed encoding {} action", label))?;
        self.connection
            .send(frame)
            .with_context(|| format!("failed sending {} action", label))?;
        log::debug!("game {}: sent {} action", self.game_id, label);
        Ok(())
    }

    /// Tear the view down. The connection is closed right away and no further
    /// frame is processed.
    pub fn deactivate(self) {
        log::info!("game {}: deactivating session", self.game_id);
        self.connection.close();
    }
}
