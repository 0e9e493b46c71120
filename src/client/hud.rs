use super::LinkStatus;
use super::game::Phase;
use crate::protocol::{PlayerInfo, StoryElementKind};

/// Text lines describing the current view for a terminal front end.
pub fn build_view_lines(game_id: &str, phase: &Phase, link: &LinkStatus) -> Vec<String> {
    let mut lines = Vec::new();

    match link {
        LinkStatus::Problem(reason) => {
            lines.push(format!("! connection problem: {} (type /reconnect)", reason));
        }
        LinkStatus::Disconnected(reason) => {
            let reason = reason.as_deref().unwrap_or("connection closed");
            lines.push(format!("! disconnected: {} (type /reconnect)", reason));
        }
        LinkStatus::Connecting | LinkStatus::Open => {}
    }

    match phase {
        Phase::Loading => lines.push("Loading game...".to_string()),
        Phase::Join => {
            lines.push(format!("Game {}: pick a name to join.", game_id));
            lines.push("  /join <name> [face]".to_string());
        }
        Phase::WaitForPlayers { players } => {
            lines.extend(roster_lines(players));
            lines.push(format!("Ask your friends to join game {}.", game_id));
            if phase.can_start_game() {
                lines.push("  /start to get this party started".to_string());
            } else {
                lines.push("  waiting for more players".to_string());
            }
        }
        Phase::WaitForGameStart { players } => {
            lines.extend(roster_lines(players));
            let creator = phase
                .creator()
                .map_or("the creator", |p| p.name.as_str());
            lines.push(format!("Waiting for {} to start game.", creator));
        }
        Phase::Draw {
            round,
            rounds,
            text,
            previous_player,
        } => {
            lines.push(format!("Round {}/{}: draw this", round, rounds));
            lines.push(format!("  \"{}\" (from {})", text, previous_player.name));
            lines.push("  /draw <image file>".to_string());
        }
        Phase::Type {
            round,
            rounds,
            image,
            previous_player,
        } => {
            match (image, previous_player) {
                (Some(image), Some(prev)) => {
                    lines.push(format!("Round {}/{}: describe {}'s drawing", round, rounds, prev.name));
                    lines.push(format!("  {}", image));
                }
                _ => lines.push(format!("Round {}/{}: start a story", round, rounds)),
            }
            lines.push("  type your text and press enter".to_string());
        }
        Phase::WaitForRoundFinish {
            players,
            type_round,
        } => {
            let what = if *type_round { "typing" } else { "drawing" };
            lines.push(format!("Waiting for others to finish {}:", what));
            lines.extend(players.iter().map(player_line));
        }
        Phase::AlreadyStarted => {
            lines.push(format!("Game {} has already started without you.", game_id));
        }
        Phase::Stories { stories } => {
            lines.push("The stories:".to_string());
            for (idx, story) in stories.iter().enumerate() {
                lines.push(format!("Story {}:", idx + 1));
                for element in &story.elements {
                    let content = match element.kind {
                        StoryElementKind::Text => format!("\"{}\"", element.content),
                        StoryElementKind::Image => format!("[drawing {}]", element.content),
                    };
                    lines.push(format!("  {}: {}", element.player.name, content));
                }
            }
        }
        Phase::Unsupported { state, .. } => {
            let state = state.as_deref().unwrap_or("?");
            lines.push(format!("This client does not understand state {:?}.", state));
        }
    }

    lines
}

fn roster_lines(players: &[PlayerInfo]) -> Vec<String> {
    let mut lines = Vec::with_capacity(players.len() + 1);
    lines.push("Players:".to_string());
    lines.extend(players.iter().map(player_line));
    lines
}

fn player_line(player: &PlayerInfo) -> String {
    let marker = if player.is_creator { " *" } else { "" };
    format!("  [{}] {}{}", player.avatar, player.name, marker)
}
