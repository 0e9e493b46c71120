use crate::protocol::{PlayerInfo, Story};
use serde::Deserialize;
use serde_json::Value;

/// The step of the game this player is in, as last declared by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Phase {
    /// No snapshot received yet.
    #[serde(skip)]
    Loading,
    /// The server has no player record for this identity yet.
    Join,
    /// Creator's lobby view.
    WaitForPlayers { players: Vec<PlayerInfo> },
    /// Lobby view for everyone but the creator.
    WaitForGameStart { players: Vec<PlayerInfo> },
    Draw {
        round: u32,
        rounds: u32,
        text: String,
        previous_player: PlayerInfo,
    },
    /// The first round has no drawing to describe, so `image` and
    /// `previous_player` are absent there.
    Type {
        round: u32,
        rounds: u32,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        previous_player: Option<PlayerInfo>,
    },
    WaitForRoundFinish {
        players: Vec<PlayerInfo>,
        #[serde(default)]
        type_round: bool,
    },
    /// A new identity tried to enter a game that is already running.
    AlreadyStarted,
    Stories { stories: Vec<Story> },
    /// The last frame could not be understood.
    #[serde(skip)]
    Unsupported {
        state: Option<String>,
        reason: String,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Join => "join",
            Phase::WaitForPlayers { .. } => "waitForPlayers",
            Phase::WaitForGameStart { .. } => "waitForGameStart",
            Phase::Draw { .. } => "draw",
            Phase::Type { .. } => "type",
            Phase::WaitForRoundFinish { .. } => "waitForRoundFinish",
            Phase::AlreadyStarted => "alreadyStarted",
            Phase::Stories { .. } => "stories",
            Phase::Unsupported { .. } => "unsupported",
        }
    }

    pub fn roster(&self) -> Option<&[PlayerInfo]> {
        match self {
            Phase::WaitForPlayers { players }
            | Phase::WaitForGameStart { players }
            | Phase::WaitForRoundFinish { players, .. } => Some(players),
            _ => None,
        }
    }

    pub fn creator(&self) -> Option<&PlayerInfo> {
        self.roster()?.iter().find(|p| p.is_creator)
    }

    /// Whether a start control should be offered. The server still decides.
    pub fn can_start_game(&self) -> bool {
        matches!(self, Phase::WaitForPlayers { players } if players.len() > 1)
    }
}

/// Decode one inbound snapshot. Never fails: anything that is not a known,
/// well-formed snapshot becomes [`Phase::Unsupported`].
pub fn decode(raw: &str) -> Phase {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(err) => {
            return unsupported(None, format!("invalid snapshot: {}", err));
        }
    };

    let state = match value.get("state") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return unsupported(None, format!("state is not a string: {}", other));
        }
        None => return unsupported(None, "snapshot has no state".to_string()),
    };

    match serde_json::from_value::<Phase>(value) {
        Ok(phase) => phase,
        Err(err) => unsupported(Some(state), err.to_string()),
    }
}

fn unsupported(state: Option<String>, reason: String) -> Phase {
    log::warn!("unsupported snapshot (state {:?}): {}", state, reason);
    Phase::Unsupported { state, reason }
}

/// Holds the current phase. Each snapshot replaces it outright.
#[derive(Debug)]
pub struct PhaseMachine {
    current: Phase,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            current: Phase::Loading,
        }
    }

    pub fn current(&self) -> &Phase {
        &self.current
    }

    pub fn apply(&mut self, raw: &str) -> &Phase {
        let next = decode(raw);
        log::debug!("phase {} -> {}", self.current.name(), next.name());
        self.current = next;
        &self.current
    }
}
