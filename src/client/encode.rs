use crate::protocol::{
    ACTION_ACCESS, ACTION_JOIN, ACTION_START, ACTION_TYPE, Action, GameId, PlayerId,
};
use std::collections::BTreeMap;
use tokio_tungstenite::tungstenite::Message;

/// One outbound websocket frame. The server tells control actions and
/// drawings apart by frame type alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    Text(String),
    Binary(Vec<u8>),
}

impl WireFrame {
    pub fn is_binary(&self) -> bool {
        matches!(self, WireFrame::Binary(_))
    }

    pub fn into_message(self) -> Message {
        match self {
            WireFrame::Text(text) => Message::Text(text),
            WireFrame::Binary(bytes) => Message::Binary(bytes),
        }
    }
}

/// Player intents the session knows how to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Access,
    Join { name: String, avatar: String },
    StartGame,
    SubmitDrawing(Vec<u8>),
    SubmitGuess(String),
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Access => ACTION_ACCESS,
            Intent::Join { .. } => ACTION_JOIN,
            Intent::StartGame => ACTION_START,
            Intent::SubmitDrawing(_) => "draw",
            Intent::SubmitGuess(_) => ACTION_TYPE,
        }
    }
}

pub fn encode_control(
    action: &str,
    content: BTreeMap<String, String>,
) -> Result<WireFrame, serde_json::Error> {
    let envelope = Action {
        action: action.to_string(),
        content,
    };
    Ok(WireFrame::Text(serde_json::to_string(&envelope)?))
}

pub fn encode_drawing(image: Vec<u8>) -> WireFrame {
    WireFrame::Binary(image)
}

pub fn encode_intent(
    intent: Intent,
    game_id: &GameId,
    player_id: &PlayerId,
) -> Result<WireFrame, serde_json::Error> {
    let mut content = BTreeMap::new();
    content.insert("gameId".to_string(), game_id.to_string());
    content.insert("playerId".to_string(), player_id.to_string());

    let action = match intent {
        Intent::SubmitDrawing(image) => return Ok(encode_drawing(image)),
        Intent::Access => ACTION_ACCESS,
        Intent::Join { name, avatar } => {
            content.insert("name".to_string(), name);
            content.insert("avatar".to_string(), avatar);
            ACTION_JOIN
        }
        Intent::StartGame => ACTION_START,
        Intent::SubmitGuess(text) => {
            content.insert("text".to_string(), text);
            ACTION_TYPE
        }
    };

    encode_control(action, content)
}
